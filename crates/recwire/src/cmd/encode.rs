use recwire_codec::encode_to_bytes;
use tracing::debug;

use crate::cmd::EncodeArgs;
use crate::exit::{codec_error, CliResult, SUCCESS};
use crate::output::{print_encoded, OutputFormat};
use crate::values::{parse_schema, parse_values};

pub fn run(args: EncodeArgs, format: OutputFormat) -> CliResult<i32> {
    let schema = parse_schema(&args.schema.schema)?;
    let values = parse_values(&schema, &args.values)?;
    let registry = args.schema.registry();

    let wire = encode_to_bytes(&registry, &schema, &values)
        .map_err(|err| codec_error("encode failed", err))?;
    debug!(fields = schema.len(), bytes = wire.len(), "encoded record");

    print_encoded(&wire, format);
    Ok(SUCCESS)
}
