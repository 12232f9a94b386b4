use gridlock::game::{GameStatus, Player, Position};
use gridlock::messages::{
    CodecError, ErrorCode, FramedMessage, Message, WireConfig, WireProtocolError,
    BUF_MESSAGE_SIZE,
};
use std::time::Duration;

mod common;
use common::mock_streams::{frame, raw_frame, ChunkedReader, StalledStream};

#[tokio::test]
async fn test_frames_survive_one_byte_reads() {
    let messages = [
        Message::new_hello("alice"),
        Message::Moved {
            player: Player::Two,
            position: Position::new(19, 19),
        },
        Message::Status {
            status: GameStatus::Draw,
        },
    ];
    let data: Vec<u8> = messages.iter().flat_map(frame).collect();
    let mut reader = ChunkedReader::new(data.clone(), 1);

    let framed = FramedMessage::default();
    for expected in &messages {
        let message = framed.read_message(&mut reader).await.unwrap();
        assert_eq!(&message, expected);
    }
    assert_eq!(reader.read_count(), data.len());
    assert!(matches!(
        framed.read_message(&mut reader).await,
        Err(WireProtocolError::ConnectionClosed)
    ));
}

#[tokio::test]
async fn test_oversized_frame_is_skipped() {
    let mut data = raw_frame(&[b'x'; 200]);
    data.extend(frame(&Message::Resign));
    let mut reader = ChunkedReader::new(data, 64);

    let framed = FramedMessage::default();
    let err = framed.read_message(&mut reader).await.unwrap_err();
    assert!(err.is_recoverable());
    assert!(matches!(
        err,
        WireProtocolError::Codec(CodecError::TooLarge { size: 200, max }) if max == BUF_MESSAGE_SIZE
    ));

    // the stream is still aligned on the next frame
    assert_eq!(framed.read_message(&mut reader).await.unwrap(), Message::Resign);
}

#[tokio::test]
async fn test_negative_coordinate_is_recoverable() {
    let mut body = vec![1u8];
    body.extend_from_slice(b"M -1 0");
    let mut data = raw_frame(&body);
    data.extend(frame(&Message::new_move(0, 0)));
    let mut reader = ChunkedReader::new(data, 3);

    let framed = FramedMessage::default();
    let err = framed.read_message(&mut reader).await.unwrap_err();
    match err {
        WireProtocolError::Codec(ref codec) => assert!(codec.is_negative_value()),
        other => panic!("unexpected error {other:?}"),
    }
    assert_eq!(
        framed.read_message(&mut reader).await.unwrap(),
        Message::new_move(0, 0)
    );
}

#[tokio::test]
async fn test_truncated_body_is_unexpected_eof() {
    let mut data = frame(&Message::new_hello("bob"));
    data.truncate(data.len() - 2);
    let mut reader = ChunkedReader::new(data, 16);

    let err = FramedMessage::default()
        .read_message(&mut reader)
        .await
        .unwrap_err();
    assert!(matches!(err, WireProtocolError::UnexpectedEof { .. }));
    assert!(!err.is_recoverable());
}

#[tokio::test]
async fn test_zero_length_prefix() {
    let mut reader = ChunkedReader::new(vec![0], 1);
    let err = FramedMessage::default()
        .read_message(&mut reader)
        .await
        .unwrap_err();
    assert!(matches!(err, WireProtocolError::InvalidLength { length: 0 }));
}

#[tokio::test]
async fn test_stalled_read_times_out() {
    let framed = FramedMessage::new(WireConfig::with_timeout(Duration::from_millis(50)));
    let mut stream = StalledStream;

    let err = framed
        .read_message_with_default_timeout(&mut stream)
        .await
        .unwrap_err();
    assert!(err.is_timeout());
    assert!(matches!(err, WireProtocolError::ReadTimeout { timeout } if timeout == Duration::from_millis(50)));
}

#[tokio::test]
async fn test_stalled_write_times_out() {
    let framed = FramedMessage::new(WireConfig::with_timeout(Duration::from_millis(50)));
    let mut stream = StalledStream;

    let err = framed
        .write_message_with_default_timeout(&mut stream, &Message::Resign)
        .await
        .unwrap_err();
    assert!(matches!(err, WireProtocolError::WriteTimeout { .. }));
}

#[tokio::test]
async fn test_scripted_exchange_with_mock_io() {
    let hello = Message::new_hello("carol");
    let error = Message::Error {
        code: ErrorCode::NotYourTurn,
    };

    let mut mock = tokio_test::io::Builder::new()
        .read(&frame(&hello))
        .write(&frame(&error))
        .build();

    let framed = FramedMessage::default();
    assert_eq!(framed.read_message(&mut mock).await.unwrap(), hello);
    framed.write_message(&mut mock, &error).await.unwrap();
}

#[tokio::test]
async fn test_unencodable_message_is_not_written() {
    let mut buffer = Vec::new();
    let framed = FramedMessage::default();

    let err = framed
        .write_message(&mut buffer, &Message::new_hello("far-too-long-name"))
        .await
        .unwrap_err();
    assert!(matches!(err, WireProtocolError::Codec(_)));
    assert!(buffer.is_empty());
}
