//! Send command: the client side of the request/reply exchange.

use serde::Serialize;
use tracing::debug;

use crate::cli::SendArgs;
use crate::config::ClientConfig;
use crate::error::{ClientError, ClientResult};
use crate::socket::{DEFAULT_MESSAGE, TcpClient};

/// One request and the reply it got.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Exchange {
    pub request: String,
    pub reply: String,
}

/// Sends each message over a single connection, in order.
///
/// An empty `messages` list sends the default greeting.
pub fn exchange_all(client: &TcpClient, messages: &[String]) -> ClientResult<Vec<Exchange>> {
    let default = [DEFAULT_MESSAGE.to_string()];
    let messages = if messages.is_empty() {
        &default[..]
    } else {
        messages
    };

    let mut session = client.connect()?;
    debug!(server = %session.peer_addr(), "connected");

    let mut exchanges = Vec::with_capacity(messages.len());
    for message in messages {
        let reply = session.request(message.as_bytes())?;
        exchanges.push(Exchange {
            request: message.clone(),
            reply: String::from_utf8_lossy(&reply).into_owned(),
        });
    }
    Ok(exchanges)
}

/// Runs `tinyredis send` and prints the replies.
pub fn run(args: &SendArgs, config: &ClientConfig) -> ClientResult<()> {
    let addr = args
        .addr
        .clone()
        .unwrap_or_else(|| config.client.address.clone());
    let client = TcpClient::new(addr);

    let exchanges = exchange_all(&client, &args.messages)?;

    if args.json {
        let json = serde_json::to_string_pretty(&exchanges)
            .map_err(|e| ClientError::Protocol(format!("failed to serialize replies: {}", e)))?;
        println!("{}", json);
    } else {
        for exchange in &exchanges {
            println!("Received: {}", exchange.reply);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;
    use tinyredis_server::{ReplyPolicy, ServerConfig, TcpServer};

    #[test]
    fn exchange_all_defaults_to_greeting() {
        let server = TcpServer::bind(ServerConfig::new("127.0.0.1:0".parse().unwrap())).unwrap();
        let addr = server.local_addr().unwrap();
        let handle = thread::spawn(move || server.run_for(&ReplyPolicy::default(), 1));

        let exchanges = exchange_all(&TcpClient::new(addr.to_string()), &[]).unwrap();
        let summaries = handle.join().unwrap();

        assert_eq!(
            exchanges,
            vec![Exchange {
                request: "Hello, Server!".into(),
                reply: "Hello, Client!".into(),
            }]
        );
        assert_eq!(summaries[0].frames, 1);
    }

    #[test]
    fn exchange_all_uses_one_connection() {
        let server = TcpServer::bind(ServerConfig::new("127.0.0.1:0".parse().unwrap())).unwrap();
        let addr = server.local_addr().unwrap();
        let handle = thread::spawn(move || server.run_for(&ReplyPolicy::Echo, 1));

        let messages = vec!["hello".to_string(), "world".to_string()];
        let exchanges = exchange_all(&TcpClient::new(addr.to_string()), &messages).unwrap();
        let summaries = handle.join().unwrap();

        let replies: Vec<_> = exchanges.iter().map(|e| e.reply.as_str()).collect();
        assert_eq!(replies, ["hello", "world"]);
        assert_eq!(summaries.len(), 1);
        assert_eq!(summaries[0].frames, 2);
    }

    #[test]
    fn exchange_serializes_as_json() {
        let exchange = Exchange {
            request: "ping".into(),
            reply: "pong".into(),
        };
        let json = serde_json::to_string(&exchange).unwrap();
        assert_eq!(json, r#"{"request":"ping","reply":"pong"}"#);
    }
}
