pub struct DefaultsConfig {
    pub initial_temperature: f64,
    pub num_steps: usize,
    pub force_threshold: f64,
    pub cooling_factor: f64,
    pub log_points: usize,
    pub wait_period: usize,
    pub use_tertiary_contacts: bool,
    pub snapshot_count: usize,
    pub label_with_ids: bool,
    pub output_name: &'static str,
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            initial_temperature: 0.0,
            num_steps: 1000,
            force_threshold: 1e-4,
            cooling_factor: 1.5,
            log_points: 20,
            wait_period: 20,
            use_tertiary_contacts: true,
            snapshot_count: 0,
            label_with_ids: false,
            output_name: "outfile",
        }
    }
}
