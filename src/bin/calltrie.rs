//! The `calltrie` binary (`spec.md` §6): `calltrie {linux|art|hash}`.

use calltrie::cli;
use calltrie::record::Records;

fn main() {
    cli::init_logging();

    let args: Vec<String> = std::env::args().collect();
    let backend = match cli::parse(&args) {
        Ok(backend) => backend,
        Err(err) => {
            eprintln!("{err}");
            std::process::exit(1);
        }
    };

    let records = Records::builtin();
    cli::run(backend, &records);
}
