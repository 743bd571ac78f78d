use prometheus::{Encoder, IntCounter, Registry, TextEncoder};

#[derive(Clone)]
pub struct PlaybackMetrics {
    pub registry: Registry,
    pub moves_completed: IntCounter,
    pub waypoints_sent: IntCounter,
    pub joint_reads: IntCounter,
    pub playback_failures: IntCounter,
}

impl PlaybackMetrics {
    pub fn new() -> Result<Self, String> {
        let registry = Registry::new();
        let counter = |name: &str, help: &str| {
            IntCounter::new(name, help).map_err(|e| format!("metrics init error: {e}"))
        };
        let moves_completed = counter("oracle_moves_completed", "Poses reached")?;
        let waypoints_sent = counter("oracle_waypoints_sent", "Joint waypoints written")?;
        let joint_reads = counter("oracle_joint_reads", "Joint reads issued to the controller")?;
        let playback_failures =
            counter("oracle_playback_failures", "Playback sequences aborted by an error")?;

        for c in [
            &moves_completed,
            &waypoints_sent,
            &joint_reads,
            &playback_failures,
        ] {
            let _ = registry.register(Box::new(c.clone()));
        }
        Ok(Self {
            registry,
            moves_completed,
            waypoints_sent,
            joint_reads,
            playback_failures,
        })
    }

    pub fn encode_text(&self) -> String {
        let mut buf = Vec::new();
        let encoder = TextEncoder::new();
        if let Err(e) = encoder.encode(&self.registry.gather(), &mut buf) {
            return format!("error encoding metrics: {e}");
        }
        String::from_utf8(buf).unwrap_or_default()
    }
}
