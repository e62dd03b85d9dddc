//! Client, adaptor chain and server tests (tuio-client)
//!
//! - Server to client over the in-memory transport
//! - Frame id ordering
//! - Listener and adaptor chains
//! - Paranoid server-side adaptors
//! - Configuration

use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

use proptest::prelude::*;
use tuio_client::{
    Adaptor, BundleProcessor, BundleSource, ClientConfig, ClientError, ContainmentAdaptor,
    ListenerRef, MemoryTransport, OscClient, ProcessorRef, Server, ServerConfig,
};
use tuio_core::messages::{ContainerAssociation, FrameMessage, GenericMessage, Pointer};
use tuio_core::{Bundle, Message, MessageKind, Point2, Timetag};
use tuio_test_utils::{hull_bundle, init_tracing, pointer_bundle, sample_hull, RecordingListener};

const NO_WAIT: Option<Duration> = Some(Duration::ZERO);

// ============================================================================
// Server to client
// ============================================================================

#[test]
fn test_server_to_client_round_trip() {
    init_tracing();
    let (tx, rx) = MemoryTransport::pair();
    let mut server = Server::new(tx, &ServerConfig::default());
    let mut client = OscClient::new(rx);

    server.sessions_mut().register_session_id(1);
    server.sessions_mut().register_session_id(2);
    server.append_clone(&Pointer::new(1, 0.25, 0.75)).unwrap();
    server.append_clone(&Pointer::new(2, 0.5, 0.5)).unwrap();
    let sent = server.send().unwrap();

    assert!(client.load(1, NO_WAIT).unwrap());
    let received = client.stack_mut().get_latest().unwrap();

    assert_eq!(received.len(), 4);
    assert_eq!(received.count_of_type::<Pointer>(), 2);
    assert_eq!(received.alive().unwrap().session_ids, vec![1, 2]);

    let sent_frame = sent.frame().unwrap();
    let received_frame = received.frame().unwrap();
    assert_eq!(received_frame.frame_id, 1);
    assert_eq!(received_frame.app_name, sent_frame.app_name);
    assert_eq!(received_frame.time, sent_frame.time);
}

#[test]
fn test_load_without_packets_returns_false() {
    let (_feed, rx) = MemoryTransport::pair();
    let mut client = OscClient::new(rx);
    let (recorder, listener) = RecordingListener::shared();
    client.add_listener(listener);

    assert!(!client.load(0, NO_WAIT).unwrap());
    assert_eq!(recorder.borrow().notifications(), 0);
}

#[test]
fn test_load_purges_previous_cycle() {
    let (mut feed, rx) = MemoryTransport::pair();
    let mut client = OscClient::new(rx);

    send(&mut feed, &pointer_bundle(1, &[1]));
    send(&mut feed, &pointer_bundle(2, &[1]));
    assert!(client.load(0, NO_WAIT).unwrap());
    assert_eq!(client.get_stack().len(), 2);

    send(&mut feed, &pointer_bundle(3, &[1]));
    assert!(client.load(0, NO_WAIT).unwrap());
    assert_eq!(client.get_stack().len(), 1);
}

#[test]
fn test_load_respects_count() {
    let (mut feed, rx) = MemoryTransport::pair();
    let mut client = OscClient::new(rx);

    for frame_id in 1..=3 {
        send(&mut feed, &pointer_bundle(frame_id, &[7]));
    }
    assert!(client.load(2, NO_WAIT).unwrap());
    assert_eq!(client.get_stack().len(), 2);
    assert_eq!(client.transport().pending(), 1);
}

// ============================================================================
// Frame ordering
// ============================================================================

#[test]
fn test_stale_frames_dropped() {
    let (mut feed, rx) = MemoryTransport::pair();
    let mut client = OscClient::new(rx);
    let (recorder, listener) = RecordingListener::shared();
    client.add_listener(listener);

    send(&mut feed, &pointer_bundle(5, &[1]));
    send(&mut feed, &pointer_bundle(4, &[1]));
    send(&mut feed, &pointer_bundle(5, &[1]));
    send(&mut feed, &pointer_bundle(6, &[1]));
    assert!(client.load(0, NO_WAIT).unwrap());

    assert_eq!(recorder.borrow().frame_ids(), &[5, 6]);
    assert_eq!(client.last_frame_id(), 6);
}

#[test]
fn test_out_of_order_frame_always_accepted() {
    let (mut feed, rx) = MemoryTransport::pair();
    let mut client = OscClient::new(rx);

    send(&mut feed, &pointer_bundle(9, &[1]));
    send(&mut feed, &pointer_bundle(0, &[1]));
    send(&mut feed, &pointer_bundle(0, &[1]));
    assert!(client.load(0, NO_WAIT).unwrap());

    assert_eq!(client.get_stack().len(), 3);
    assert_eq!(client.last_frame_id(), 9);
}

#[test]
fn test_bundle_without_frame_dropped() {
    let (mut feed, rx) = MemoryTransport::pair();
    let mut client = OscClient::new(rx);

    let headless = pointer_bundle(1, &[1]);
    headless.remove(0).unwrap();
    send(&mut feed, &headless);
    assert!(!client.load(0, NO_WAIT).unwrap());
}

#[test]
fn test_accept_unknown_keeps_generic() {
    let (mut feed, rx) = MemoryTransport::pair();
    let config = ClientConfig {
        accept_unknown: true,
        ..ClientConfig::default()
    };
    let mut client = OscClient::from_config(rx, &config);

    let bundle = pointer_bundle(1, &[1]);
    let custom = rosc::OscMessage {
        addr: "/custom/thing".to_string(),
        args: vec![rosc::OscType::Int(42)],
    };
    bundle.insert(1, GenericMessage::from_osc(&custom)).unwrap();
    send(&mut feed, &bundle);

    assert!(client.load(0, NO_WAIT).unwrap());
    let received = client.stack_mut().get_latest().unwrap();
    let generic = received
        .messages()
        .iter()
        .filter(|m| m.kind() == MessageKind::Generic)
        .count();
    assert_eq!(generic, 1);
}

#[test]
fn test_disabled_convertor_drops_messages() {
    let (mut feed, rx) = MemoryTransport::pair();
    let config = ClientConfig {
        convertors: vec!["/tuio2/frm".to_string(), "/tuio2/alv".to_string()],
        ..ClientConfig::default()
    };
    let mut client = OscClient::from_config(rx, &config);

    send(&mut feed, &pointer_bundle(1, &[1, 2]));
    assert!(client.load(0, NO_WAIT).unwrap());
    let received = client.stack_mut().get_latest().unwrap();
    assert_eq!(received.len(), 2);
    assert_eq!(received.count_of_type::<Pointer>(), 0);
}

// ============================================================================
// Listeners and adaptors
// ============================================================================

#[test]
fn test_listener_added_once() {
    let (mut feed, rx) = MemoryTransport::pair();
    let mut client = OscClient::new(rx);
    let (recorder, listener) = RecordingListener::shared();

    assert!(client.add_listener(listener.clone()));
    assert!(!client.add_listener(listener.clone()));

    send(&mut feed, &pointer_bundle(1, &[1]));
    client.load(0, NO_WAIT).unwrap();
    assert_eq!(recorder.borrow().notifications(), 1);

    assert!(client.del_listener(&listener));
    send(&mut feed, &pointer_bundle(2, &[1]));
    client.load(0, NO_WAIT).unwrap();
    assert_eq!(recorder.borrow().notifications(), 1);
}

#[test]
fn test_containment_adaptor_chain() {
    init_tracing();
    let (mut feed, rx) = MemoryTransport::pair();
    let mut client = OscClient::new(rx);

    let adaptor = Rc::new(RefCell::new(Adaptor::new(ContainmentAdaptor::new())));
    let (recorder, listener) = RecordingListener::shared();
    adaptor.borrow_mut().add_listener(listener);
    let adaptor_listener: ListenerRef = adaptor.clone();
    client.add_listener(adaptor_listener);

    send(&mut feed, &hull_bundle(1, 40, Point2::new(1.0, 2.5)));
    send(&mut feed, &hull_bundle(2, 40, Point2::new(-2.0, -1.0)));
    assert!(client.load(0, NO_WAIT).unwrap());

    let recorder = recorder.borrow();
    assert_eq!(recorder.notifications(), 1);
    assert_eq!(recorder.frame_ids(), &[1, 2]);

    let inside = &recorder.bundles()[0];
    let coa = inside.message_of_type::<ContainerAssociation>(0).unwrap();
    assert_eq!(coa.session_id, 40);
    assert_eq!(coa.contained, vec![41]);
    assert!(inside.check_output().is_ok());

    let outside = &recorder.bundles()[1];
    assert_eq!(outside.count_of_type::<ContainerAssociation>(), 0);

    // Client bundles are untouched by a copying adaptor
    let upstream = client.get_stack();
    let first = upstream.iter().next().unwrap();
    assert_eq!(first.count_of_type::<ContainerAssociation>(), 0);
}

// ============================================================================
// Server-side adaptors
// ============================================================================

struct Failing;

impl BundleProcessor for Failing {
    fn process_bundle(&mut self, _input: &Bundle, _output: &Bundle) -> tuio_core::Result<()> {
        Err(tuio_core::Error::Geometry("refused".to_string()))
    }
}

struct Unframed;

impl BundleProcessor for Unframed {
    fn process_bundle(&mut self, input: &Bundle, output: &Bundle) -> tuio_core::Result<()> {
        tuio_client::prepare_output(input, output);
        output.remove(0)?;
        Ok(())
    }
}

#[test]
fn test_failing_adaptor_skipped() {
    let (tx, rx) = MemoryTransport::pair();
    let mut server = Server::new(tx, &ServerConfig::default());
    let failing: ProcessorRef = Rc::new(RefCell::new(Failing));
    assert!(server.add_adaptor(failing.clone()));
    assert!(!server.add_adaptor(failing.clone()));
    assert_eq!(server.adaptor_count(), 1);

    server.send().unwrap();
    assert_eq!(rx.pending(), 1);

    assert!(server.del_adaptor(&failing));
    assert_eq!(server.adaptor_count(), 0);
}

#[test]
fn test_paranoid_server_aborts() {
    let (tx, rx) = MemoryTransport::pair();
    let config = ServerConfig {
        paranoid: true,
        ..ServerConfig::default()
    };
    let mut server = Server::new(tx, &config);
    server.add_adaptor(Rc::new(RefCell::new(Failing)));

    let err = server.send().unwrap_err();
    assert!(matches!(err, ClientError::Adaptor(_)));
    assert_eq!(rx.pending(), 0);
}

#[test]
fn test_failed_send_keeps_queue() {
    let (tx, rx) = MemoryTransport::pair();
    let config = ServerConfig {
        paranoid: true,
        ..ServerConfig::default()
    };
    let mut server = Server::new(tx, &config);
    let mut client = OscClient::new(rx);
    let failing: ProcessorRef = Rc::new(RefCell::new(Failing));
    server.add_adaptor(failing.clone());

    server.sessions_mut().register_session_id(1);
    server.append_clone(&Pointer::new(1, 0.5, 0.5)).unwrap();
    assert!(server.send().is_err());
    assert_eq!(server.pending().len(), 1);
    assert_eq!(server.frames().get_current_frame_id(), 0);

    server.del_adaptor(&failing);
    let sent = server.send().unwrap();
    assert_eq!(sent.len(), 3);
    assert!(server.pending().is_empty());

    assert!(client.load(1, NO_WAIT).unwrap());
    let received = client.stack_mut().get_latest().unwrap();
    assert_eq!(received.frame().unwrap().frame_id, 1);
    assert_eq!(received.count_of_type::<Pointer>(), 1);
}

#[test]
fn test_output_check_blocks_unframed_bundle() {
    let (tx, rx) = MemoryTransport::pair();
    let mut server = Server::new(tx, &ServerConfig::default());
    server.add_adaptor(Rc::new(RefCell::new(Unframed)));

    let err = server.send().unwrap_err();
    assert!(matches!(err, ClientError::Core(tuio_core::Error::Malformed(_))));
    assert_eq!(rx.pending(), 0);
}

#[test]
fn test_server_containment_adaptor() {
    let (tx, rx) = MemoryTransport::pair();
    let mut server = Server::new(tx, &ServerConfig::default());
    let mut client = OscClient::new(rx);
    server.add_adaptor(Rc::new(RefCell::new(ContainmentAdaptor::new())));

    server.sessions_mut().register_session_id(40);
    server.sessions_mut().register_session_id(41);
    server.append_clone(&sample_hull(40)).unwrap();
    server.append_clone(&Pointer::new(41, 1.0, 2.5)).unwrap();
    server.send().unwrap();

    assert!(client.load(1, NO_WAIT).unwrap());
    let received = client.stack_mut().get_latest().unwrap();
    assert_eq!(received.count_of_type::<ContainerAssociation>(), 1);
    assert!(matches!(received.get(received.len() - 2), Some(Message::AliveAssociation(_))));
}

#[test]
fn test_extended_frame_from_config() {
    let (tx, rx) = MemoryTransport::pair();
    let config = ServerConfig::from_json(
        r#"{"source_name": "tracker", "instance_id": 3, "dimension": [1280, 720]}"#,
    )
    .unwrap();
    let mut server = Server::new(tx, &config);
    let mut client = OscClient::new(rx);

    server
        .append_clone(&FrameMessage::new(0, Timetag::new(1, 0)).with_source(
            "override",
            std::net::Ipv4Addr::new(10, 0, 0, 1),
            9,
        ))
        .unwrap();
    server.send().unwrap();
    client.load(1, NO_WAIT).unwrap();

    let received = client.stack_mut().get_latest().unwrap();
    let frame = received.frame().unwrap();
    assert_eq!(frame.app_name, "override");
    assert_eq!(frame.instance_id, 9);
    assert_eq!(frame.source_address(), std::net::Ipv4Addr::new(10, 0, 0, 1));
    assert_eq!((frame.width, frame.height), (0, 0));
}

fn send(feed: &mut MemoryTransport, bundle: &Bundle) {
    tuio_client::Transport::send(feed, &bundle.encode().unwrap()).unwrap();
}

// ============================================================================
// Properties
// ============================================================================

proptest! {
    #[test]
    fn prop_accepted_frames_increase(ids in prop::collection::vec(1u32..500, 1..30)) {
        let (mut feed, rx) = MemoryTransport::pair();
        let mut client = OscClient::new(rx);
        let (recorder, listener) = RecordingListener::shared();
        client.add_listener(listener);

        for &id in &ids {
            send(&mut feed, &pointer_bundle(id, &[1]));
        }
        prop_assert!(client.load(0, NO_WAIT).unwrap());

        let accepted = recorder.borrow().frame_ids().to_vec();
        prop_assert_eq!(accepted[0], ids[0]);
        prop_assert!(accepted.windows(2).all(|w| w[0] < w[1]));
        prop_assert_eq!(client.last_frame_id(), *ids.iter().max().unwrap());
    }
}
