//! End-to-end codec round trips: component tree → wire bytes → component
//! tree, through both the binary and the tree-text packagers.

use switchwire_codec::{
    BinaryPackager, FixedChar, LlAsciiChar, LlBcdChar, LlBinaryBytes, LlBinaryChar, XmlPackager,
};
use switchwire_message::IsoMsg;

fn authorization_packager() -> BinaryPackager {
    BinaryPackager::new()
        .required_field(0, FixedChar::new(4, "message type indicator"))
        .required_field(2, LlBinaryChar::new(19, "primary account number").unwrap())
        .field(32, LlAsciiChar::new(11, "acquiring institution id").unwrap())
        .field(35, LlBcdChar::new(37, "track 2 data").unwrap())
        .field(52, LlBinaryBytes::new(8, "pin block").unwrap())
}

fn sample_message() -> IsoMsg {
    let mut msg = IsoMsg::root();
    msg.set_field(0, "0100");
    msg.set_field(2, "4111111111111111");
    msg.set_field(32, "12345");
    msg.set_field(35, "4111111111111111=991233000");
    msg.set_binary(52, vec![0x8A, 0x1F, 0x00, 0x42, 0x13, 0x37, 0xBE, 0xEF]);
    msg
}

#[test]
fn binary_pack_unpack_preserves_every_field() {
    let packager = authorization_packager();
    let msg = sample_message();

    let wire = packager.pack(&msg).unwrap();
    let parsed = packager.unpack(&wire).unwrap();

    assert_eq!(parsed.get(0).unwrap().as_text(), Some("0100"));
    assert_eq!(parsed.get(2).unwrap().as_text(), Some("4111111111111111"));
    assert_eq!(parsed.get(32).unwrap().as_text(), Some("12345"));
    assert_eq!(
        parsed.get(35).unwrap().as_text(),
        Some("4111111111111111=991233000")
    );
    assert_eq!(
        parsed.get(52).unwrap().as_binary(),
        Some(&[0x8A, 0x1F, 0x00, 0x42, 0x13, 0x37, 0xBE, 0xEFu8][..])
    );
}

#[test]
fn binary_wire_layout_is_table_ordered() {
    let packager = BinaryPackager::new()
        .required_field(0, FixedChar::new(4, "message type indicator"))
        .required_field(12, LlBinaryChar::new(20, "local transaction time").unwrap());

    let mut msg = IsoMsg::root();
    msg.set_field(12, "ABCDEFGHIJ");
    msg.set_field(0, "0800");

    let wire = packager.pack(&msg).unwrap();
    let mut expected = b"0800".to_vec();
    expected.push(0x0A);
    expected.extend_from_slice(b"ABCDEFGHIJ");
    assert_eq!(wire, expected);
}

#[test]
fn xml_and_binary_forms_agree() {
    // Unpack a textual dump, repack it in binary form, and read it back.
    let doc = br#"
        <isomsg>
          <field id="0" value="0100"/>
          <field id="2" value="4111111111111111"/>
          <field id="52" value="8A1F00421337BEEF" type="binary"/>
        </isomsg>"#;

    let mut msg = IsoMsg::root();
    XmlPackager::new().unpack(&mut msg, doc).unwrap();

    let packager = authorization_packager();
    let wire = packager.pack(&msg).unwrap();
    let parsed = packager.unpack(&wire).unwrap();

    assert_eq!(parsed.get(2).unwrap().as_text(), Some("4111111111111111"));
    assert_eq!(
        parsed.get(52).unwrap().as_binary(),
        msg.get(52).unwrap().as_binary()
    );
}

#[test]
fn xml_dump_of_unpacked_binary_message_round_trips() {
    let packager = authorization_packager();
    let msg = sample_message();

    let wire = packager.pack(&msg).unwrap();
    let parsed = packager.unpack(&wire).unwrap();

    let xml = XmlPackager::new().pack(&parsed);
    let mut reparsed = IsoMsg::root();
    XmlPackager::new().unpack(&mut reparsed, &xml).unwrap();

    assert_eq!(reparsed, parsed);
}
