use secrecy::SecretString;

pub mod create_admin;
pub mod server;

#[derive(Debug)]
pub enum Action {
    Server {
        port: u16,
        dsn: String,
        base_url: String,
        session_ttl: i64,
    },
    CreateAdmin {
        dsn: String,
        identifier: String,
        password: SecretString,
    },
}
