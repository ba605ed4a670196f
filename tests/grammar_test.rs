use legacy_hub::{
    message::{Canonized, Keywords, MessageCode},
    parse_command, parse_reply,
    parser::{parse_reply_header, split_command_header},
    Key, Reply, ReplyHeader, ValueType,
};
use pretty_assertions::assert_eq;
use proptest::prelude::*;

fn typed_reply(notes: &[String], counts: &[i32]) -> Reply {
    let note = Key::new("note", [ValueType::string().repeat(1, None).unwrap()]).unwrap();
    let count = Key::new("count", [ValueType::int().repeat(1, None).unwrap()]).unwrap();
    let keywords: Keywords = vec![
        note.create(notes.iter().map(String::as_str)).unwrap(),
        count.create(counts.iter().map(ToString::to_string)).unwrap(),
    ]
    .into();
    let header = ReplyHeader::new("tron", "tron", "", 4, "alerts", MessageCode::Information);
    Reply::new(header, keywords)
}

#[test]
fn it_reparses_canonical_replies() {
    let lines = [
        "tron.tron 4 tcc i axePos=12.5,-3.25,NaN; text=\"hello, world\"",
        ".hub 0 hub w user=\"a b\",cmds; failed",
        "cmdr.me.stack 99 mcp : ",
    ];
    for line in lines {
        let reply = parse_reply(line).unwrap();
        let again = parse_reply(&reply.canonical()).unwrap();
        assert_eq!(again.canonical(), reply.canonical(), "{line}");
        assert_eq!(again, reply);
    }
}

#[test]
fn it_shares_tokenized_form_between_same_shapes() {
    let a = parse_reply("a.b 1 act i x=1,2; y").unwrap();
    let b = parse_reply("c.d 200 other I X=\"q\",zz;Y").unwrap();
    assert_eq!(a.tokenized(), b.tokenized());
    assert_ne!(a.canonical(), b.canonical());

    let c = parse_reply("a.b 1 act i x=1,2,3; y").unwrap();
    assert_ne!(a.tokenized(), c.tokenized());
}

#[test]
fn it_parses_incoming_command_lines() {
    let (commander, mid, body) = split_command_header("tron.tron 7 Move 1,2 speed=fast\n").unwrap();
    assert_eq!(commander.as_deref(), Some("tron.tron"));
    assert_eq!(mid, 7);

    let command = parse_command(&body).unwrap();
    assert_eq!(command.name(), "Move");
    assert_eq!(command.canonical(), "move 1,2 speed=\"fast\"");
    assert_eq!(parse_command(&command.canonical()).unwrap(), command);
}

#[test]
fn it_returns_header_and_body() {
    let (header, body) = parse_reply_header("tron.tron 12 alerts i activeAlerts=A").unwrap();
    assert_eq!(header.commander(), "tron.tron");
    assert_eq!(header.command_id(), 12);
    assert_eq!(body, "activeAlerts=A");
}

#[test]
fn it_reparses_typed_values_with_quotes() {
    let reply = typed_reply(&["say \"hi\"".to_string(), "it's".to_string()], &[1, -2]);
    assert_eq!(
        reply.canonical(),
        r#"tron.tron 4 alerts I note="say \"hi\"","it's";count=1,-2"#
    );
    let again = parse_reply(&reply.canonical()).unwrap();
    assert_eq!(again.canonical(), reply.canonical());
}

proptest! {
    #[test]
    fn prop_typed_reply_canonical_reparses(
        notes in prop::collection::vec("[a-zA-Z0-9 '\";=,.]{1,8}", 1..4),
        counts in prop::collection::vec(any::<i32>(), 1..4),
    ) {
        let reply = typed_reply(&notes, &counts);
        let canonical = reply.canonical();
        let again = parse_reply(&canonical).unwrap();
        prop_assert_eq!(again.canonical(), canonical);
    }
}
