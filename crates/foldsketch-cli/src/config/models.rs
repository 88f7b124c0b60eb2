use foldsketch::engine::config::LayoutConfig;
use foldsketch::workflows::draw::AnnotationFormat;
use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub sequence: String,
    pub first_id: i64,
    pub missing: Vec<i64>,
    pub annotation_paths: Vec<PathBuf>,
    pub annotation_format: AnnotationFormat,
    /// Common prefix of every output file, `<name>.DRAW`.
    pub output_prefix: String,
    pub trace_path: Option<PathBuf>,
    pub seed: Option<u64>,
    pub core_config: LayoutConfig,
}
