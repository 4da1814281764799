fn main() {
    if let Err(e) = voice_notes_lib::run() {
        eprintln!("voice-notes: {}", e);
        std::process::exit(1);
    }
}
