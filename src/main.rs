fn main() {
    if let Err(e) = validation_checklist_lib::run() {
        eprintln!("validation-checklist: {}", e);
        std::process::exit(1);
    }
}
