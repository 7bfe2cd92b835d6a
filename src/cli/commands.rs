// Slash command handling

pub enum Command {
    Models,
    Clear,
    Exit,
}

impl Command {
    pub fn parse(input: &str) -> Option<Self> {
        match input.trim() {
            "/models" => Some(Command::Models),
            "/clear" => Some(Command::Clear),
            "/exit" => Some(Command::Exit),
            _ => None,
        }
    }
}
