use recwire_codec::{decode_record, ByteBuffer};

use crate::cmd::DecodeArgs;
use crate::exit::{codec_error, io_error, CliError, CliResult, SUCCESS};
use crate::output::{print_record, OutputFormat};
use crate::values::parse_schema;

pub fn run(args: DecodeArgs, format: OutputFormat) -> CliResult<i32> {
    let schema = parse_schema(&args.schema.schema)?;
    let registry = args.schema.registry();

    let wire = match (&args.hex, &args.file) {
        (Some(text), _) => {
            let text: String = text.chars().filter(|c| !c.is_whitespace()).collect();
            hex::decode(text.trim_start_matches("0x"))
                .map_err(|err| CliError::data(format!("invalid hex: {err}")))?
        }
        (None, Some(path)) => std::fs::read(path)
            .map_err(|err| io_error(&format!("read {} failed", path.display()), err))?,
        (None, None) => return Err(CliError::usage("one of --hex or --file is required")),
    };

    let mut buf = ByteBuffer::from(wire);
    let values =
        decode_record(&registry, &schema, &mut buf).map_err(|err| codec_error("decode failed", err))?;

    print_record(&schema, &values, None, Some(buf.len()), format);
    Ok(SUCCESS)
}
