fn main() {
    if let Err(e) = opalc_drv::run(std::env::args().skip(1)) {
        eprintln!("{}", e);
        std::process::exit(1);
    }
}
