//! Tests for the C ABI surface

use super::*;
use crate::handle::{Handle, HandleKind};

fn call(bridge: *const AstBridge, name: &str, args: &[RawArg]) -> (i32, RawArg) {
    let mut out = RawArg::void();
    let code = unsafe { astbridge_call(bridge, name.as_ptr(), name.len(), args.as_ptr(), args.len(), &mut out) };
    (code, out)
}

fn read_string(bridge: *const AstBridge, handle: u64) -> String {
    unsafe {
        let len = astbridge_string_len(bridge, handle);
        assert!(len >= 0);
        let mut buf = vec![0u8; len as usize];
        assert_eq!(astbridge_string_copy(bridge, handle, buf.as_mut_ptr(), buf.len()), len);
        String::from_utf8(buf).unwrap()
    }
}

fn new_session() -> (*mut AstBridge, u64) {
    let bridge = astbridge_new();
    assert!(!bridge.is_null());
    let file = "main.ets";
    let ctx = unsafe { astbridge_context_create(bridge, file.as_ptr(), file.len(), std::ptr::null(), 0) };
    assert_ne!(ctx, 0);
    (bridge, ctx)
}

#[test]
fn test_identifier_through_abi() {
    let (bridge, ctx) = new_session();
    let name = "foo";

    let (code, node) = call(bridge, "CreateIdentifier1", &[RawArg::handle(ctx), RawArg::string(name.as_ptr(), name.len())]);
    assert_eq!(code, 0);
    assert_eq!(node.tag, tag::HANDLE);
    let node_bits = unsafe { node.value.handle };
    assert_eq!(Handle::from_bits(node_bits).kind(), Some(HandleKind::AstNode));

    let (code, result) = call(bridge, "IdentifierNameConst", &[RawArg::handle(ctx), RawArg::handle(node_bits)]);
    assert_eq!(code, 0);
    let string = result.owned_string().unwrap();
    let bits = Handle::from(string).to_bits();
    assert_eq!(read_string(bridge, bits), "foo");

    unsafe {
        assert_eq!(astbridge_release(bridge, bits), 0);
        // Second release is detected, not a double free
        assert_eq!(astbridge_release(bridge, bits), -8);
        assert_eq!(astbridge_last_error_code(), -8);
        astbridge_free(bridge);
    }
}

#[test]
fn test_array_through_abi() {
    let (bridge, ctx) = new_session();
    let mut elements = Vec::new();
    for value in [1, 2, 3] {
        let (code, node) = call(bridge, "CreateNumberLiteral", &[RawArg::handle(ctx), RawArg::i32(value)]);
        assert_eq!(code, 0);
        elements.push(unsafe { node.value.handle });
    }

    let (code, array) = call(
        bridge,
        "CreateArrayExpression",
        &[RawArg::handle(ctx), RawArg::handle_array(elements.as_ptr(), elements.len())],
    );
    assert_eq!(code, 0);

    let (code, seq) = call(bridge, "ArrayExpressionElementsConst", &[RawArg::handle(ctx), array]);
    assert_eq!(code, 0);
    let (handle, len) = seq.sequence().unwrap();
    assert_eq!(len, 3);

    let bits = Handle::from(handle).to_bits();
    unsafe {
        assert_eq!(astbridge_sequence_len(bridge, bits), 3);
        for (i, expected) in elements.iter().enumerate() {
            assert_eq!(astbridge_sequence_get(bridge, bits, i), *expected);
        }
        assert_eq!(astbridge_sequence_get(bridge, bits, 3), 0);
        assert_eq!(astbridge_last_error_code(), -9);
        astbridge_free(bridge);
    }
}

#[test]
fn test_errors_are_reported() {
    let (bridge, ctx) = new_session();

    let (code, _) = call(bridge, "NoSuchOperation", &[]);
    assert_eq!(code, -1);
    let mut buf = [0u8; 128];
    let len = unsafe { astbridge_last_error_message(buf.as_mut_ptr(), buf.len()) };
    assert_eq!(std::str::from_utf8(&buf[..len]).unwrap(), "unknown operation `NoSuchOperation`");

    // Context passed where a node is expected
    let (code, _) = call(bridge, "IdentifierNameConst", &[RawArg::handle(ctx), RawArg::handle(ctx)]);
    assert_eq!(code, -6);

    let (code, _) = call(bridge, "CreateIdentifier1", &[RawArg::handle(ctx)]);
    assert_eq!(code, -4);

    let code = unsafe { astbridge_call(std::ptr::null(), std::ptr::null(), 0, std::ptr::null(), 0, std::ptr::null_mut()) };
    assert_eq!(code, -11);

    unsafe { astbridge_free(bridge) };
}

#[test]
fn test_stale_handles_after_context_destroy() {
    let (bridge, ctx) = new_session();
    let (code, node) = call(bridge, "CreateBooleanLiteral", &[RawArg::handle(ctx), RawArg::bool(true)]);
    assert_eq!(code, 0);

    unsafe {
        assert_eq!(astbridge_context_destroy(bridge, ctx), 0);
    }
    let (code, _) = call(bridge, "BooleanLiteralValueConst", &[RawArg::handle(ctx), node]);
    assert_eq!(code, -8);
    unsafe { astbridge_free(bridge) };
}

#[test]
fn test_signature_and_manifest() {
    let (bridge, _) = new_session();
    let name = "CreateBinaryExpression";
    unsafe {
        let sig = astbridge_signature(bridge, name.as_ptr(), name.len());
        assert_eq!(read_string(bridge, sig), "AstNode|Context|AstNode|AstNode|i32");

        let manifest = astbridge_manifest(bridge);
        let json = read_string(bridge, manifest);
        let parsed = crate::interop::Manifest::from_json(&json).unwrap();
        assert!(parsed.find(name).is_some());
        assert_eq!(parsed.max_arity, 13);
        astbridge_free(bridge);
    }
}
