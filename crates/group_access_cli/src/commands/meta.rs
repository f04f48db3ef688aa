use std::io::Write;

use clap::CommandFactory;
use group_access::Result;

use crate::Cli;

fn completion_script(shell: clap_complete::Shell) -> Vec<u8> {
    let mut cmd = Cli::command();
    let mut out = Vec::new();
    clap_complete::generate(shell, &mut cmd, "group-access-tool", &mut out);
    out
}

pub(crate) fn handle_completions(shell: clap_complete::Shell) -> Result<()> {
    let out = completion_script(shell);
    std::io::stdout().write_all(&out)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_completion_script_contains_binary_name() {
        let script = completion_script(clap_complete::Shell::Bash);
        let script = String::from_utf8(script).expect("completion output should be UTF-8");
        assert!(script.contains("group-access-tool"));
    }
}
