//! Loopback server and raw peer helpers

use gridlock::config::ServerConfig;
use gridlock::game::{Board, Opponent, Outcome};
use gridlock::messages::{FramedMessage, Message, WireConfig, WireProtocolError};
use gridlock::network::{Connection, Server, SessionHandler};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::AsyncWriteExt;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::oneshot;
use tokio::task::JoinHandle;

pub const TEST_SEED: u64 = 42;
pub const RECV_TIMEOUT: Duration = Duration::from_secs(5);

pub fn test_config(field_size: u8, win_length: u8) -> ServerConfig {
    ServerConfig {
        port: 0,
        field_size,
        win_length,
        number_of_moves: u32::from(field_size).pow(2),
        move_timeout: Duration::from_secs(5),
        ..ServerConfig::default()
    }
}

/// A server running on an ephemeral loopback port
pub struct TestServer {
    pub addr: SocketAddr,
    shutdown: oneshot::Sender<()>,
    handle: JoinHandle<anyhow::Result<()>>,
}

impl TestServer {
    pub async fn start(config: ServerConfig) -> Self {
        Self::start_with_grace(config, Duration::from_secs(5)).await
    }

    pub async fn start_with_grace(config: ServerConfig, grace: Duration) -> Self {
        let addr: SocketAddr = "127.0.0.1:0".parse().unwrap();
        let server = Server::bind_to(addr, Arc::new(config))
            .await
            .expect("bind test server")
            .with_opponent_seed(TEST_SEED)
            .with_shutdown_grace(grace);
        let addr = server.local_addr().unwrap();

        let (shutdown, signal) = oneshot::channel::<()>();
        let handle = tokio::spawn(server.run_until(async move {
            let _ = signal.await;
        }));

        Self {
            addr,
            shutdown,
            handle,
        }
    }

    /// Ask the server to stop and wait until every session has ended
    pub async fn stop(self) -> anyhow::Result<()> {
        let _ = self.shutdown.send(());
        tokio::time::timeout(Duration::from_secs(10), self.handle)
            .await
            .expect("server did not stop in time")
            .expect("server task panicked")
    }
}

/// Run one [`SessionHandler`] against a raw peer; the join handle yields the outcome
pub async fn session_pair(
    board: Board,
    max_malformed: u32,
    read_timeout: Duration,
) -> (JoinHandle<Outcome>, RawPeer) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let peer = RawPeer::connect(addr).await;
    let (stream, _) = listener.accept().await.unwrap();

    let connection = Connection::new(stream, WireConfig::new(read_timeout, RECV_TIMEOUT));
    let handler = SessionHandler::new(
        connection,
        board,
        max_malformed,
        Opponent::with_seed(TEST_SEED),
    );
    (tokio::spawn(handler.run()), peer)
}

/// Test client that can send arbitrary bytes
pub struct RawPeer {
    stream: TcpStream,
    framed: FramedMessage,
}

impl RawPeer {
    pub async fn connect(addr: SocketAddr) -> Self {
        let stream = TcpStream::connect(addr).await.expect("connect to test server");
        Self {
            stream,
            framed: FramedMessage::new(WireConfig::with_timeout(RECV_TIMEOUT)),
        }
    }

    pub async fn send(&mut self, message: &Message) {
        self.framed
            .write_message_with_default_timeout(&mut self.stream, message)
            .await
            .expect("send message");
    }

    pub async fn send_raw(&mut self, bytes: &[u8]) {
        self.stream.write_all(bytes).await.expect("send raw bytes");
        self.stream.flush().await.unwrap();
    }

    pub async fn recv(&mut self) -> Result<Message, WireProtocolError> {
        self.framed
            .read_message_with_default_timeout(&mut self.stream)
            .await
    }

    /// Receive a message the test insists on
    pub async fn expect(&mut self, expected: Message) {
        let got = self.recv().await.expect("server message");
        assert_eq!(got, expected);
    }

    /// Send `Hello` and consume the `Welcome` and first `Turn`
    pub async fn join(&mut self, name: &str) -> Message {
        self.send(&Message::new_hello(name)).await;
        let welcome = self.recv().await.expect("welcome");
        assert!(matches!(welcome, Message::Welcome { .. }), "got {:?}", welcome);
        self.expect(Message::Turn {
            player: gridlock::game::Player::One,
        })
        .await;
        welcome
    }

    /// Drain messages until the server closes the connection
    pub async fn recv_until_closed(&mut self) -> Vec<Message> {
        let mut received = Vec::new();
        loop {
            match self.recv().await {
                Ok(message) => received.push(message),
                Err(WireProtocolError::ConnectionClosed) => return received,
                Err(e) => panic!("expected a clean close, got {e}"),
            }
        }
    }

    pub fn into_stream(self) -> TcpStream {
        self.stream
    }
}
