//! A minimal WebSocket client for exercising a running hub instance in
//! integration tests, without pulling a browser or a second hub-protocol
//! dependency into the test harness.

use futures_util::{SinkExt, StreamExt};
use tokio_tungstenite::MaybeTlsStream;
use tokio_tungstenite::tungstenite::protocol::Message;

type WsStream = tokio_tungstenite::WebSocketStream<MaybeTlsStream<tokio::net::TcpStream>>;

pub struct MockWsClient {
    write: futures_util::stream::SplitSink<WsStream, Message>,
    read: futures_util::stream::SplitStream<WsStream>,
}

impl MockWsClient {
    pub async fn connect(url: &str) -> Result<Self, Box<dyn std::error::Error>> {
        let (ws_stream, _response) = tokio_tungstenite::connect_async(url).await?;
        let (write, read) = ws_stream.split();
        Ok(Self { write, read })
    }

    /// Sends one protocol line. The caller supplies the trailing `\n` only
    /// when the test means to send multiple frames in a single message.
    pub async fn send_line(&mut self, line: &str) -> Result<(), Box<dyn std::error::Error>> {
        self.write.send(Message::Text(line.to_owned().into())).await?;
        Ok(())
    }

    /// Receives one text message, skipping pings/pongs. Does not split it
    /// into frames — callers that send multi-line messages split themselves.
    pub async fn recv_text(&mut self) -> Result<String, Box<dyn std::error::Error>> {
        loop {
            match self.read.next().await {
                Some(Ok(Message::Text(text))) => return Ok(text.to_string()),
                Some(Ok(Message::Ping(_))) | Some(Ok(Message::Pong(_))) => continue,
                Some(Ok(Message::Close(_))) => return Err("connection closed by server".into()),
                Some(Ok(_)) => continue,
                Some(Err(e)) => return Err(e.into()),
                None => return Err("connection stream ended".into()),
            }
        }
    }

    pub async fn close(&mut self) -> Result<(), Box<dyn std::error::Error>> {
        self.write.send(Message::Close(None)).await?;
        Ok(())
    }
}
