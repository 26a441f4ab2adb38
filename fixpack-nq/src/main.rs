use fixpack::*;
use std::io::{self, Read, Write};
use anyhow::{bail, Context, Result};
use log::debug;
use structopt::StructOpt;
use std::str::from_utf8;

/// Decode and print fixpack messages, or encode JSON documents into them
#[derive(StructOpt)]
#[structopt(name = "nq", author = "Liv Fischer")]
struct Opt {
    /// read a JSON document and encode it into a binary message instead
    #[structopt(short, long)]
    encode: bool,
    /// print decoded messages as JSON instead of the annotated text form
    #[structopt(short, long)]
    json: bool,
    /// indent JSON output
    #[structopt(short, long, requires = "json")]
    pretty: bool,
    /// the binary side is base64 text: input when decoding, output when encoding
    #[structopt(short, long)]
    base64: bool,
}

fn main() -> Result<()> {
    env_logger::init();
    let opt = Opt::from_args();
    let mut buffer = Vec::new();
    io::stdin().read_to_end(&mut buffer).context("Failed to read stdin")?;
    debug!("read {} bytes from stdin", buffer.len());
    if opt.encode {
        encode(&opt, &buffer)
    } else {
        print(&opt, &buffer)
    }
}

fn print(opt: &Opt, buffer: &[u8]) -> Result<()> {
    let buffer = if opt.base64 {
        let text = from_utf8(buffer).context("input is not utf-8")?;
        base64::decode(text.trim()).context("input is not valid base64")?
    } else {
        buffer.to_vec()
    };
    let value = Decoder::decode_document(&buffer).context("Decoding error")?;
    if opt.json && opt.pretty {
        println!("{}", fixpack_serde::to_json_pretty(&value)?);
    } else if opt.json {
        println!("{}", fixpack_serde::to_json(&value)?);
    } else {
        println!("{}", &value);
    }
    Ok(())
}

/// Documents are maps, so anything else at the root is refused just like the decoder would.
fn encode_document(input: &str) -> Result<Vec<u8>> {
    let value = fixpack_serde::from_json(input).context("input is not a valid JSON document")?;
    if !matches!(value, Value::Map(_)) {
        bail!("Document root must be a map, found {}", value.typename());
    }
    to_vec(&value).context("Encoding error")
}

fn encode(opt: &Opt, buffer: &[u8]) -> Result<()> {
    let string = from_utf8(buffer).context("input is not utf-8")?;
    let bytes = encode_document(string)?;
    debug!("encoded {} bytes", bytes.len());
    let mut stdout = io::stdout();
    if opt.base64 {
        writeln!(stdout, "{}", base64::encode(&bytes))?;
    } else {
        stdout.write_all(&bytes)?;
    }
    stdout.flush().context("Failed to write stdout")
}
