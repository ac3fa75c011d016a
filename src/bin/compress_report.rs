use lzhuff::compression::{decompress, measure, Algorithm, MemorySink, RecordSink};
use lzhuff::{Error, Result};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::process;

const PREVIEW_BYTES: usize = 16;

struct Args {
    input: PathBuf,
    algorithms: Vec<Algorithm>,
    out_dir: Option<PathBuf>,
}

fn usage() -> String {
    "usage: compress_report <file> [lzw|huffman|all] [--out DIR]".to_string()
}

fn parse_args(mut args: impl Iterator<Item = String>) -> Result<Args> {
    let mut input = None;
    let mut algorithms = Algorithm::ALL.to_vec();
    let mut out_dir = None;
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--out" => {
                let dir = args
                    .next()
                    .ok_or_else(|| Error::invalid_input("--out needs a directory"))?;
                out_dir = Some(PathBuf::from(dir));
            }
            "all" if input.is_some() => algorithms = Algorithm::ALL.to_vec(),
            _ if input.is_none() => input = Some(PathBuf::from(&arg)),
            name => algorithms = vec![name.parse()?],
        }
    }
    let input = input.ok_or_else(|| Error::invalid_input(usage()))?;
    Ok(Args {
        input,
        algorithms,
        out_dir,
    })
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

fn run(args: Args) -> Result<()> {
    let data = fs::read(&args.input)?;
    let name = file_name(&args.input);
    let mut sink = MemorySink::new();

    println!("Original Size: {} bytes", data.len());
    for algorithm in &args.algorithms {
        let (compressed, record) = measure(*algorithm, &name, &data)?;
        if decompress(*algorithm, &compressed)? != data {
            return Err(Error::malformed(format!(
                "{} round trip did not reproduce {}",
                algorithm, name
            )));
        }
        let preview = &compressed[..compressed.len().min(PREVIEW_BYTES)];
        println!("{} | {}", record, hex::encode(preview));

        if let Some(dir) = &args.out_dir {
            fs::create_dir_all(dir)?;
            let path = dir.join(format!(
                "compressed_{}_{}",
                algorithm.label().to_lowercase(),
                name
            ));
            fs::write(&path, &compressed)?;
            println!("saved {}", path.display());
        }
        sink.record(&record)?;
    }

    let best = sink
        .records()
        .iter()
        .min_by(|a, b| a.compressed_size.cmp(&b.compressed_size));
    if let Some(best) = best {
        println!("Best: {} ({} bytes)", best.algorithm, best.compressed_size);
    }
    Ok(())
}

fn main() {
    let result = parse_args(env::args().skip(1)).and_then(run);
    if let Err(err) = result {
        eprintln!("error: {}", err);
        process::exit(1);
    }
}
