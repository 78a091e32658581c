use std::time::Duration;

//Wall-clock cost of the stages that make up one frame.
#[derive(Debug, Default, Clone)]
pub struct FrameTime {
    time_tracking: Duration,
    time_update: Duration,
    time_render: Duration,
}

impl FrameTime {
    pub fn new(tracking: Duration, update: Duration, render: Duration) -> Self {
        Self {
            time_tracking: tracking,
            time_update: update,
            time_render: render,
        }
    }

    pub fn zero() -> Self {
        Self::default()
    }

    //Frame ingestion plus the exchange with the tracking worker.
    pub fn tracking_stage(&self) -> &Duration {
        &self.time_tracking
    }

    //Mesh deformation and surface realignment.
    pub fn update_stage(&self) -> &Duration {
        &self.time_update
    }

    pub fn render_stage(&self) -> &Duration {
        &self.time_render
    }

    pub fn total(&self) -> Duration {
        *self.tracking_stage() + *self.update_stage() + *self.render_stage()
    }
}
