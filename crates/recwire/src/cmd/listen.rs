use crate::cmd::ListenArgs;
use crate::exit::CliResult;
use crate::output::OutputFormat;

#[cfg(unix)]
pub use unix::run;

#[cfg(not(unix))]
pub fn run(_args: ListenArgs, _format: OutputFormat) -> CliResult<i32> {
    Err(crate::exit::CliError::new(
        crate::exit::TRANSPORT_ERROR,
        "listen requires Unix domain sockets",
    ))
}

#[cfg(unix)]
mod unix {
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;

    use recwire_codec::{DecoderConfig, RecordReader};
    use recwire_source::UnixDomainSocket;
    use tracing::warn;

    use super::{CliResult, ListenArgs, OutputFormat};
    use crate::exit::{codec_error, source_error, CliError, INTERNAL, SUCCESS};
    use crate::output::print_record;
    use crate::values::parse_schema;

    pub fn run(args: ListenArgs, format: OutputFormat) -> CliResult<i32> {
        let schema = parse_schema(&args.schema.schema)?;
        let registry = Arc::new(args.schema.registry());
        let config = DecoderConfig {
            chunk_size: args.chunk_size,
        };

        let listener =
            UnixDomainSocket::bind(&args.path).map_err(|err| source_error("bind failed", err))?;

        let running = Arc::new(AtomicBool::new(true));
        install_ctrlc_handler(running.clone())?;

        let mut printed = 0usize;

        while running.load(Ordering::SeqCst) {
            let source = listener
                .accept()
                .map_err(|err| source_error("accept failed", err))?;
            let mut reader = RecordReader::with_config(source, registry.clone(), config);

            while running.load(Ordering::SeqCst) {
                let values = match reader.read_values(&schema) {
                    Ok(Some(values)) => values,
                    Ok(None) => break,
                    Err(err) if err.is_data_error() => {
                        warn!(error = %err, "dropping connection");
                        break;
                    }
                    Err(err) => return Err(codec_error("receive failed", err)),
                };

                print_record(&schema, &values, Some(printed), None, format);
                printed = printed.saturating_add(1);

                if let Some(count) = args.count {
                    if printed >= count {
                        return Ok(SUCCESS);
                    }
                }
            }
        }

        Ok(SUCCESS)
    }

    fn install_ctrlc_handler(running: Arc<AtomicBool>) -> CliResult<()> {
        ctrlc::set_handler(move || {
            running.store(false, Ordering::SeqCst);
        })
        .map_err(|err| CliError::new(INTERNAL, format!("signal handler setup failed: {err}")))
    }
}
