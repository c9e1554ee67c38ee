//! Wire-level test of the visualizer transport over a real UDP socket.

use std::net::UdpSocket;
use std::time::Duration;

use touchline::DrawTransport;

#[test]
fn line_and_swap_arrive_as_one_exact_datagram() {
    let receiver = UdpSocket::bind("127.0.0.1:0").unwrap();
    receiver.set_read_timeout(Some(Duration::from_secs(2))).unwrap();
    let addr = receiver.local_addr().unwrap().to_string();

    let draw = DrawTransport::new(addr);
    draw.draw_line(0.0, 0.0, 0.0, 0.0, 0.0, 2.0, 5.0, 1.0, 1.0, 1.0, "dbg");
    draw.swap_buffers("dbg");
    assert!(draw.flush(), "flush should report bytes sent");

    let mut datagram = [0u8; 256];
    let received = receiver.recv(&mut datagram).unwrap();

    let mut expected: Vec<u8> = vec![0x01, 0x01];
    for float in ["0.0000", "0.0000", "0.0000", "0.0000", "0.0000", "2.0000", "5.0000"] {
        expected.extend_from_slice(float.as_bytes());
    }
    expected.extend_from_slice(&[0xFF, 0xFF, 0xFF]);
    expected.extend_from_slice(b"dbg\0");
    expected.extend_from_slice(&[0x00, 0x00]);
    expected.extend_from_slice(b"dbg\0");

    assert_eq!(received, expected.len());
    assert_eq!(&datagram[..received], expected.as_slice());
}

#[test]
fn consecutive_flushes_are_separate_datagrams() {
    let receiver = UdpSocket::bind("127.0.0.1:0").unwrap();
    receiver.set_read_timeout(Some(Duration::from_secs(2))).unwrap();
    let addr = receiver.local_addr().unwrap().to_string();

    let draw = DrawTransport::new(addr);
    draw.swap_buffers("a");
    assert!(draw.flush());
    draw.swap_buffers("b");
    assert!(draw.flush());

    let mut datagram = [0u8; 64];
    let first = receiver.recv(&mut datagram).unwrap();
    assert_eq!(&datagram[..first], b"\0\0a\0");
    let second = receiver.recv(&mut datagram).unwrap();
    assert_eq!(&datagram[..second], b"\0\0b\0");
}
