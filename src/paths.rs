use std::path::PathBuf;
use std::sync::OnceLock;

static EXE_DIR: OnceLock<PathBuf> = OnceLock::new();

/// Returns the directory containing the executable.
pub fn get_exe_dir() -> &'static PathBuf {
    EXE_DIR.get_or_init(|| {
        std::env::current_exe()
            .ok()
            .and_then(|p| p.parent().map(|p| p.to_path_buf()))
            .unwrap_or_else(|| PathBuf::from("."))
    })
}

/// Returns the logs directory: `<exe_dir>/logs/`
pub fn get_logs_dir() -> PathBuf {
    get_exe_dir().join("logs")
}

/// Returns the configuration file path: `<exe_dir>/config.json`
pub fn config_path() -> PathBuf {
    get_exe_dir().join("config.json")
}

/// Returns the name-mapping file path: `<exe_dir>/name-mapping.json`
pub fn name_mapping_path() -> PathBuf {
    get_exe_dir().join("name-mapping.json")
}

/// Returns the root of all per-region output: `<exe_dir>/res/`
pub fn get_res_dir() -> PathBuf {
    get_exe_dir().join("res")
}

/// Returns the output directory for one region: `<exe_dir>/res/<index>/`
pub fn get_region_dir(index: u32) -> PathBuf {
    get_res_dir().join(index.to_string())
}

/// Returns the screenshot directory for one region.
pub fn get_screenshot_dir(index: u32) -> PathBuf {
    get_region_dir(index).join("screenshot")
}

/// Returns the persisted ranking history file for one region.
pub fn history_path(index: u32) -> PathBuf {
    get_region_dir(index).join("json").join("datas.json")
}

/// Returns the CSV export path for one region.
pub fn csv_path(index: u32) -> PathBuf {
    get_region_dir(index).join("csv").join("datas.csv")
}

/// Ensures the logs directory and every region's output tree exist.
/// Call at startup, before the first pipeline run.
pub fn ensure_directories(indices: &[u32]) -> std::io::Result<()> {
    std::fs::create_dir_all(get_logs_dir())?;
    for &index in indices {
        std::fs::create_dir_all(get_screenshot_dir(index))?;
        std::fs::create_dir_all(get_region_dir(index).join("json"))?;
        std::fs::create_dir_all(get_region_dir(index).join("csv"))?;
    }
    Ok(())
}

/// Lists the region indices that already have an output tree on disk.
/// Export mode uses this to rebuild CSVs without any configuration.
pub fn discover_region_indices() -> Vec<u32> {
    let mut indices: Vec<u32> = std::fs::read_dir(get_res_dir())
        .map(|entries| {
            entries
                .filter_map(|e| e.ok())
                .filter_map(|e| e.file_name().to_str().and_then(|s| s.parse().ok()))
                .collect()
        })
        .unwrap_or_default();
    indices.sort_unstable();
    indices
}
