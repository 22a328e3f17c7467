use letin::Interpreter;

fn main() {
    env_logger::init();
    let args: Vec<String> = std::env::args().collect();
    if args.len() < 2 {
        println!("Usage: letin <filename>");
        return;
    }
    if let Err(msg) = run_script(&args[1]) {
        println!("{msg}");
    }
}

fn run_script(filename: &str) -> Result<(), String> {
    let source = std::fs::read_to_string(filename)
        .map_err(|_| format!("Error opening file: {filename}"))?;
    for outcome in Interpreter::new(&source) {
        println!("{outcome}");
    }
    Ok(())
}
