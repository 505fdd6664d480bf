fn main() {
    #[cfg(feature = "cli")]
    rsrc_dcmp::cli::run();

    #[cfg(not(feature = "cli"))]
    {
        eprintln!("rsrc-dcmp: CLI not enabled. Rebuild with `--features cli`.");
        std::process::exit(1);
    }
}
