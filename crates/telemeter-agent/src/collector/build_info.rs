use telemeter_core::{Collector, DescriptionSink, Gauge, MetricSink};

/// Constant `build_info` gauge labelled with package name and version.
pub struct BuildInfoCollector {
    info: Gauge,
}

impl BuildInfoCollector {
    pub fn new(name: &str, version: &str) -> Self {
        let info = Gauge::new(
            "build_info",
            "Build information of the running binary",
            &["name", name, "version", version],
        );
        info.set(1.0);
        Self { info }
    }

    /// Build info of this agent crate.
    pub fn agent() -> Self {
        Self::new(env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"))
    }
}

impl Collector for BuildInfoCollector {
    fn describe(&self, sink: &mut dyn DescriptionSink) {
        self.info.describe(sink);
    }

    fn collect(&self, sink: &mut dyn MetricSink) {
        self.info.collect(sink);
    }
}
