//! Short-lived decoder contexts.
//!
//! Some stream fields (rate ceiling, coded dimensions, reference count, raw
//! sample depth, exported decoder options) only exist once a decoder has been
//! opened on the stream's parameters. A missing decoder is not an error; the
//! stream simply keeps default values for those fields.

use tracing::{debug, warn};

use crate::error::{AvProbeError, AvResult};
use crate::ports::ContainerHandle;

/// Open a decoder for stream `index`, or `None` when the codec is
/// unidentified or no decoder is registered for it.
///
/// Failing to allocate, configure or open a decoder that does exist is fatal.
pub fn resolve<C: ContainerHandle>(container: &C, index: usize) -> AvResult<Option<C::Context>> {
    let codec_id = match container.stream(index).and_then(|stream| stream.codec.map(|codec| codec.codec_id)) {
        Some(codec_id) => codec_id,
        None => {
            debug!(stream = index, "no codec parameters");
            return Ok(None);
        }
    };

    if codec_id.is_unidentified() {
        warn!(stream = index, "codec is unidentified, skipping decoder");
        return Ok(None);
    }

    let decoder = match container.find_decoder(codec_id) {
        Some(decoder) => decoder,
        None => {
            warn!(stream = index, codec_id = codec_id.0, "no decoder registered for codec");
            return Ok(None);
        }
    };

    let mut context = container
        .alloc_decoder_context(decoder)
        .ok_or_else(|| AvProbeError::allocation("decoder context"))?;

    let status = container.copy_parameters(&mut context, index);
    if status < 0 {
        return Err(AvProbeError::driver(
            format!("copy codec parameters for input stream {}", index),
            status,
            container.describe_status(status),
        ));
    }

    let status = container.open_decoder(&mut context, decoder);
    if status < 0 {
        return Err(AvProbeError::driver(
            format!("could not open codec for input stream {}", index),
            status,
            container.describe_status(status),
        ));
    }

    debug!(stream = index, "decoder context opened");
    Ok(Some(context))
}
