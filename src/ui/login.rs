use std::io::{self, BufRead, Write};

pub const EMAIL_ENV: &str = "TANEDU_EMAIL";
pub const PASSWORD_ENV: &str = "TANEDU_PASSWORD";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

impl Credentials {
    /// Both fields are required before anything is sent to the server.
    pub fn validate(&self) -> Result<(), &'static str> {
        if self.email.trim().is_empty() || self.password.is_empty() {
            return Err("Minden mezőt ki kell tölteni!");
        }
        Ok(())
    }
}

pub fn prompt<R: BufRead, W: Write>(input: &mut R, output: &mut W, label: &str) -> io::Result<String> {
    write!(output, "{label}: ")?;
    output.flush()?;
    let mut line = String::new();
    input.read_line(&mut line)?;
    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}

/// Fill in whatever was not given on the command line: `env` first (looked up by
/// [`EMAIL_ENV`] and [`PASSWORD_ENV`]), then an interactive prompt.
pub fn resolve_credentials<R, W, E>(
    email: Option<String>,
    password: Option<String>,
    env: E,
    input: &mut R,
    output: &mut W,
) -> io::Result<Credentials>
where
    R: BufRead,
    W: Write,
    E: Fn(&str) -> Option<String>,
{
    let email = match email.or_else(|| env(EMAIL_ENV)) {
        Some(e) => e,
        None => prompt(input, output, "Email")?,
    };
    let password = match password.or_else(|| env(PASSWORD_ENV)) {
        Some(p) => p,
        None => prompt(input, output, "Jelszó")?,
    };
    Ok(Credentials { email: email.trim().to_string(), password })
}
