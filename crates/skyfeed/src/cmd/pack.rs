use bytes::BytesMut;
use skyfeed_frame::{encode_frame, FrameConfig};
use skyfeed_message::encode_message;
use tracing::info;

use crate::cmd::PackArgs;
use crate::exit::{io_error, CliError, CliResult, DATA_INVALID, SUCCESS, USAGE};

/// Build the exact wire bytes the broadcast receiver would emit for one
/// transmission, so `listen` can be exercised without a live receiver:
/// `skyfeed pack photo.jpg -o /tmp/skyfeed/api`.
pub fn run(args: PackArgs) -> CliResult<i32> {
    let payload =
        std::fs::read(&args.input).map_err(|err| io_error("read input file failed", err))?;

    let body = if args.raw {
        payload
    } else {
        let name = match &args.name {
            Some(name) => name.clone(),
            None => args
                .input
                .file_name()
                .and_then(|n| n.to_str())
                .map(str::to_string)
                .ok_or_else(|| {
                    CliError::new(USAGE, "input file name is not valid UTF-8; use --name")
                })?,
        };

        let mut buf = BytesMut::new();
        encode_message(&name, &payload, &mut buf)
            .map_err(|err| CliError::new(DATA_INVALID, format!("message encoding failed: {err}")))?;
        buf.to_vec()
    };

    let mut wire = BytesMut::new();
    encode_frame(&body, &mut wire, &FrameConfig::default());

    std::fs::write(&args.output, &wire).map_err(|err| io_error("write output failed", err))?;

    info!(
        output = %args.output.display(),
        bytes = wire.len(),
        "wrote framed transmission"
    );
    println!("{}", args.output.display());
    Ok(SUCCESS)
}
