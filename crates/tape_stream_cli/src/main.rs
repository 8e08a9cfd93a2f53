use std::io::{self, IsTerminal};
use std::process::ExitCode;

use tape_stream::{logging, EnvConfig, EventProcessor};
use tape_stream_cli::progress::restore_terminal;
use tape_stream_cli::{run, NoProgress, ProgressSink, Spinner};
use tracing::{debug, warn};

fn main() -> ExitCode {
    let env = EnvConfig::from_env();
    logging::init(env.log_filter.as_deref());

    let config = env.processor_config();
    let show_progress = env.progress && io::stderr().is_terminal();
    let mut progress: Box<dyn ProgressSink> = if show_progress {
        Box::new(Spinner::stderr(config.color))
    } else {
        Box::new(NoProgress)
    };

    #[cfg(unix)]
    let _signals = match tape_stream_cli::platform::install_signal_handlers(move |signal| {
        if show_progress {
            restore_terminal();
        }
        std::process::exit(tape_stream_cli::platform::signal_exit_code(signal));
    }) {
        Ok(guard) => Some(guard),
        Err(error) => {
            warn!(%error, "failed to install signal handlers");
            None
        }
    };

    let mut processor = EventProcessor::with_plain_renderer(config);
    let stdin = io::stdin();
    let mut stdout = io::stdout().lock();
    let result = run(stdin.lock(), &mut stdout, &mut processor, progress.as_mut());
    drop(progress);

    match result {
        Ok(stats) => {
            debug!(?stats, "done");
            ExitCode::SUCCESS
        }
        Err(error) => {
            eprintln!("{error}");
            ExitCode::FAILURE
        }
    }
}
