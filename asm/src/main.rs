use color_print::{cformat, cprintln};
use rvasm::Assembler;

const HELP_TEMPLATE: &str = "\
{before-help}{bin} {version}
  {author}
  {about}

{usage-heading}
{tab}{usage}

{all-args}{after-help}";

#[derive(Debug, clap::Parser)]
#[clap(author, version, about, help_template = HELP_TEMPLATE)]
struct Args {
    /// Input files
    #[clap(default_value = "main.s")]
    input: Vec<String>,

    /// Output file for the text segment
    #[clap(short, long, default_value = "main.bin")]
    output: String,

    /// Output file for the data segment
    #[clap(short, long, default_value = "main.dat")]
    data: String,

    /// Write a YAML symbol map
    #[clap(short, long)]
    map: Option<String>,

    /// Load address of the data segment
    #[clap(long, default_value = "0x10000000", value_parser = parse_addr)]
    data_start: u32,

    /// Dump the assembled listing
    #[clap(long)]
    dump: bool,
}

fn parse_addr(s: &str) -> Result<u32, String> {
    match rvarch::imm::parse_int(s) {
        Ok(value) => {
            let value = value as u32;
            if value % 4 == 0 {
                Ok(value)
            } else {
                Err("data start must be word aligned".to_string())
            }
        }
        Err(err) => Err(err.to_string()),
    }
}

fn main() {
    use clap::Parser;
    use std::io::Write;

    let args: Args = Args::parse();
    println!("RV32 Assembler");

    println!("1. Read Files and Parse Lines");
    let mut source = String::new();
    for path in &args.input {
        println!("  < {}", path);
        let text = std::fs::read_to_string(path)
            .expect(&cformat!("<r,s>Failed to open File</>: {}", path));
        source.push_str(&text);
        source.push('\n');
    }

    println!("2. Resolve Labels & Generate Binary");
    let mut asm = Assembler::new(args.data_start);
    asm.assemble(&source);
    println!("  - found #{} labels", asm.symbols().len());

    for err in asm.errors() {
        cprintln!("<red,bold>error</>: {}", err);
    }

    println!("  > {}", &args.output);
    let mut file = std::fs::File::create(&args.output)
        .expect(&cformat!("<r,s>Failed to create File</>: {}", &args.output));
    file.write_all(asm.text_segment())
        .expect(&cformat!("<r,s>Failed to write File</>: {}", &args.output));

    if asm.has_data() {
        println!("  > {}", &args.data);
        std::fs::write(&args.data, asm.data_segment())
            .expect(&cformat!("<r,s>Failed to write File</>: {}", &args.data));
    }

    if let Some(path) = &args.map {
        println!("  > {}", path);
        std::fs::write(path, asm.symbols().to_yaml())
            .expect(&cformat!("<r,s>Failed to write File</>: {}", path));
    }

    if args.dump {
        for (row, inst) in asm.rows() {
            let base = (*row as usize) * 4;
            let word = u32::from_le_bytes(asm.text_segment()[base..base + 4].try_into().unwrap());
            println!("[{:04X}] {:08X} | {}", row, word, inst.cformat());
        }
        println!("-------------------+-----------------------------------------------------");
    }

    if asm.has_error() {
        std::process::exit(1);
    }
}
