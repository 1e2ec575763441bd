use super::*;

#[test]
fn parses_binary_message() {
    let mut decoder = Decoder::new();
    let data = [0xFFu8, 0x80, 0x00, 0x00, 0x00, 0xFF, 0xFF, 0xFF];
    let encoded = BASE64.encode(data);
    let line = format!("!PDGY,127251,2,35,255,12.345,{encoded}");
    match decoder.parse_line(&line).unwrap().unwrap() {
        Event::Binary(msg) => {
            assert_eq!(msg.pgn, 127251);
            assert_eq!(msg.priority, 2);
            assert_eq!(msg.src, 35);
            assert_eq!(msg.dst, 255);
            assert_eq!(msg.timestamp_ms, 12_345);
            assert_eq!(msg.data, data);
        }
        other => panic!("unexpected {other:?}"),
    }
}

#[test]
fn status_lines_count_toward_reset_threshold() {
    let mut decoder = Decoder::new();
    for _ in 0..STATUS_ONLY_RESET_THRESHOLD {
        decoder.parse_line("$PDGY,RX,foo").unwrap();
    }
    assert_eq!(decoder.status_only_streak, STATUS_ONLY_RESET_THRESHOLD);
}

#[test]
fn binary_message_resets_status_streak() {
    let mut decoder = Decoder::new();
    decoder.parse_line("$PDGY,RX,foo").unwrap();
    let encoded = BASE64.encode([1, 2, 3]);
    decoder
        .parse_line(&format!("!PDGY,59904,6,0,255,1.0,{encoded}"))
        .unwrap();
    assert_eq!(decoder.status_only_streak, 0);
}

#[test]
fn timestamp_roll_around_rebases_forward() {
    let mut decoder = Decoder::new();
    let encoded = BASE64.encode([1]);
    let line = |t: &str| format!("!PDGY,59904,6,0,255,{t},{encoded}");

    let first = match decoder.parse_line(&line("100.0")).unwrap().unwrap() {
        Event::Binary(m) => m.timestamp_ms,
        _ => unreachable!(),
    };
    let second = match decoder.parse_line(&line("200.0")).unwrap().unwrap() {
        Event::Binary(m) => m.timestamp_ms,
        _ => unreachable!(),
    };
    assert_eq!(second - first, 100_000);

    // Device clock wraps back to a small value; absolute time keeps moving forward.
    let third = match decoder.parse_line(&line("5.0")).unwrap().unwrap() {
        Event::Binary(m) => m.timestamp_ms,
        _ => unreachable!(),
    };
    assert!(third > second);
}

#[test]
fn malformed_line_is_rejected() {
    let mut decoder = Decoder::new();
    assert!(decoder.parse_line("garbage").is_err());
}

#[test]
fn init_dialog_runs_offline_then_online_without_allow_list() {
    let mut dialog = InitDialog::new(false, false, false);
    assert_eq!(dialog.next_command(false).unwrap(), "OFFLINE\r\n");
    assert!(!dialog.acknowledge());
    assert_eq!(dialog.next_command(false).unwrap(), "ONLINE,ALL\r\n");
    assert!(dialog.acknowledge());
    assert!(dialog.is_complete());
}

#[test]
fn init_dialog_includes_rx_tx_lists_with_allow_list() {
    let mut dialog = InitDialog::new(true, false, false);
    let mut commands = Vec::new();
    while !dialog.is_complete() {
        commands.push(dialog.next_command(true).unwrap());
        dialog.acknowledge();
    }
    assert_eq!(
        commands,
        vec!["OFFLINE\r\n", "RESET\r\n", "RX_LIST\r\n", "TX_LIST\r\n", "ONLINE,NORMAL\r\n"]
    );
}
