use embassy_futures::join::join;
use embedded_hal::digital::InputPin;

use crate::{
    app::LampController,
    domain::ports::{ChannelHost, OutputRegisters},
};

/// Run the deferred halves of both edge pipelines.
///
/// Each pipeline consumes its own work signal; both contend for the
/// activation lock, so a removal queued during the arrival animation runs
/// once that animation has finished.
pub async fn run_edge_workers<R, S, H>(controller: &LampController<R, S, H>)
where
    R: OutputRegisters,
    S: InputPin,
    H: ChannelHost,
{
    join(
        controller.run_detection_worker(),
        controller.run_removal_worker(),
    )
    .await;
}
