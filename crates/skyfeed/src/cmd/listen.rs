use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use skyfeed_pipe::Pipe;
use skyfeed_rx::{
    Decryptor, DownloadSink, GpgDecryptor, PassthroughDecryptor, ProcessingMode, Receiver,
};
use tracing::info;

use crate::cmd::ListenArgs;
use crate::exit::{pipe_error, rx_error, CliError, CliResult, SUCCESS};
use crate::output::{print_stats, OutputFormat};

pub fn run(args: ListenArgs, format: OutputFormat) -> CliResult<i32> {
    let shutdown = Arc::new(AtomicBool::new(false));
    install_ctrlc_handler(shutdown.clone())?;

    let mode = if args.plaintext {
        ProcessingMode::Plaintext
    } else if args.save_raw {
        ProcessingMode::RawSave
    } else {
        ProcessingMode::Standard
    };

    let decryptor: Box<dyn Decryptor> = match mode {
        ProcessingMode::Plaintext => Box::new(PassthroughDecryptor),
        _ => Box::new(GpgDecryptor::new(&args.gnupghome)),
    };

    let sink = DownloadSink::new(&args.download_dir);
    let mut receiver = Receiver::new(decryptor, sink, mode);
    if let Some(count) = args.count {
        receiver.set_limit(count);
    }

    info!(pipe = %args.pipe.display(), ?mode, "starting receive loop");
    let pipe = Pipe::open(&args.pipe).map_err(|err| pipe_error("open pipe failed", err))?;

    let stats = receiver
        .run(pipe, &shutdown)
        .map_err(|err| rx_error("receive loop failed", err))?;

    print_stats(&stats, format);
    Ok(SUCCESS)
}

fn install_ctrlc_handler(shutdown: Arc<AtomicBool>) -> CliResult<()> {
    ctrlc::set_handler(move || {
        shutdown.store(true, Ordering::SeqCst);
    })
    .map_err(|err| {
        CliError::new(
            crate::exit::INTERNAL,
            format!("signal handler setup failed: {err}"),
        )
    })
}
