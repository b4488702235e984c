fn main() {
    if let Err(e) = forkfft::run() {
        forkfft::exit_fatal(&forkfft::program_name(), &e);
    }
}
