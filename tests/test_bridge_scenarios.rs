use astbridge::backend::memory::TokenType;
use astbridge::{
    Bridge, BridgeConfig, BridgeError, Context, Handle, HandleKind, MemoryBackend, WireValue,
};
use std::sync::Arc;

fn bridge() -> (Bridge<MemoryBackend>, Context) {
    let bridge = Bridge::memory(BridgeConfig::default()).unwrap();
    let ctx = bridge.backend().create_context("scenario.ets", "");
    (bridge, ctx)
}

fn ident(bridge: &Bridge<MemoryBackend>, ctx: Context, name: &str) -> Handle {
    bridge
        .call("CreateIdentifier1", [WireValue::handle(ctx), name.into()])
        .unwrap()
        .as_handle()
        .unwrap()
}

#[test]
fn test_create_identifier_then_read_name() {
    let (bridge, ctx) = bridge();
    let node = ident(&bridge, ctx, "foo");

    let name = bridge
        .call("IdentifierNameConst", [WireValue::handle(ctx), node.into()])
        .unwrap()
        .as_owned_string()
        .unwrap();
    assert_eq!(bridge.string(name).unwrap(), "foo");
}

#[test]
fn test_binary_expression_keeps_operands_and_operator() {
    let (bridge, ctx) = bridge();
    let a = ident(&bridge, ctx, "a");
    let b = ident(&bridge, ctx, "b");
    let bin = bridge
        .call(
            "CreateBinaryExpression",
            [WireValue::handle(ctx), a.into(), b.into(), TokenType::PUNCTUATOR_PLUS.0.into()],
        )
        .unwrap();

    let left = bridge.call("BinaryExpressionLeft", [WireValue::handle(ctx), bin.clone()]).unwrap();
    let right = bridge.call("BinaryExpressionRight", [WireValue::handle(ctx), bin.clone()]).unwrap();
    let op = bridge.call("BinaryExpressionOperatorTypeConst", [WireValue::handle(ctx), bin]).unwrap();

    assert_eq!(left, WireValue::Handle(a));
    assert_eq!(right, WireValue::Handle(b));
    assert_eq!(op, WireValue::I32(TokenType::PUNCTUATOR_PLUS.0));
}

#[test]
fn test_array_elements_have_explicit_length_and_order() {
    let (bridge, ctx) = bridge();
    let items = vec![ident(&bridge, ctx, "a"), ident(&bridge, ctx, "b"), ident(&bridge, ctx, "c")];
    let array = bridge
        .call("CreateArrayExpression", [WireValue::handle(ctx), items.clone().into()])
        .unwrap();

    let (seq, len) = bridge
        .call("ArrayExpressionElementsConst", [WireValue::handle(ctx), array])
        .unwrap()
        .as_sequence()
        .unwrap();
    assert_eq!(len, 3);
    assert_eq!(bridge.sequence(seq).unwrap(), items);
    assert_eq!(bridge.resources().sequence_get(seq, 1).unwrap(), items[1]);
}

#[test]
fn test_update_with_same_fields_is_structurally_equal() {
    let (bridge, ctx) = bridge();
    let a = ident(&bridge, ctx, "a");
    let b = ident(&bridge, ctx, "b");
    let plus = TokenType::PUNCTUATOR_PLUS.0;
    let bin = bridge
        .call("CreateBinaryExpression", [WireValue::handle(ctx), a.into(), b.into(), plus.into()])
        .unwrap();
    let updated = bridge
        .call(
            "UpdateBinaryExpression",
            [WireValue::handle(ctx), bin.clone(), a.into(), b.into(), plus.into()],
        )
        .unwrap();

    for accessor in ["BinaryExpressionLeftConst", "BinaryExpressionRightConst", "BinaryExpressionOperatorTypeConst"] {
        assert_eq!(
            bridge.call(accessor, [WireValue::handle(ctx), bin.clone()]).unwrap(),
            bridge.call(accessor, [WireValue::handle(ctx), updated.clone()]).unwrap(),
        );
    }
    assert_eq!(
        bridge.call("AstNodeOriginalNodeConst", [WireValue::handle(ctx), updated]).unwrap(),
        bin
    );
}

#[test]
fn test_const_and_mutable_accessors_agree() {
    let (bridge, ctx) = bridge();
    let a = ident(&bridge, ctx, "a");
    let b = ident(&bridge, ctx, "b");
    let bin = bridge
        .call("CreateBinaryExpression", [WireValue::handle(ctx), a.into(), b.into(), 1i32.into()])
        .unwrap();

    let left = bridge.call("BinaryExpressionLeft", [WireValue::handle(ctx), bin.clone()]).unwrap();
    let left_const = bridge.call("BinaryExpressionLeftConst", [WireValue::handle(ctx), bin]).unwrap();
    assert_eq!(left, left_const);
}

#[test]
fn test_each_string_result_is_a_fresh_handle() {
    let (bridge, ctx) = bridge();
    let node = ident(&bridge, ctx, "same");

    let first = bridge
        .call("IdentifierName", [WireValue::handle(ctx), node.into()])
        .unwrap()
        .as_owned_string()
        .unwrap();
    let second = bridge
        .call("IdentifierName", [WireValue::handle(ctx), node.into()])
        .unwrap()
        .as_owned_string()
        .unwrap();

    assert_ne!(first, second);
    assert_eq!(bridge.string(first).unwrap(), bridge.string(second).unwrap());

    bridge.release(first.into()).unwrap();
    assert_eq!(bridge.string(second).unwrap(), "same");
    assert!(matches!(bridge.string(first), Err(BridgeError::StaleHandle { .. })));
}

#[test]
fn test_handles_go_stale_with_their_context() {
    let (bridge, ctx) = bridge();
    let node = ident(&bridge, ctx, "gone");
    bridge.backend().destroy_context(ctx).unwrap();

    let fresh = bridge.backend().create_context("next.ets", "");
    let err = bridge
        .call("IdentifierName", [WireValue::handle(fresh), node.into()])
        .unwrap_err();
    assert_eq!(
        err.root(),
        &BridgeError::StaleHandle {
            kind: HandleKind::AstNode,
            index: node.raw().index,
            generation: node.raw().generation,
        }
    );
}

#[test]
fn test_shared_backend_across_bridges() {
    let backend = Arc::new(MemoryBackend::new());
    let first = Bridge::with_catalog(Arc::clone(&backend), BridgeConfig::default()).unwrap();
    let second = Bridge::with_catalog(Arc::clone(&backend), BridgeConfig::default()).unwrap();
    let ctx = backend.create_context("shared.ets", "");

    let node = first
        .call("CreateIdentifier1", [WireValue::handle(ctx), "shared".into()])
        .unwrap();
    let name = second
        .call("IdentifierNameConst", [WireValue::handle(ctx), node])
        .unwrap()
        .as_owned_string()
        .unwrap();

    // Results belong to the bridge that produced them
    assert_eq!(second.string(name).unwrap(), "shared");
    assert!(first.string(name).is_err());
}

#[test]
fn test_concurrent_calls() {
    let (bridge, ctx) = bridge();
    let bridge = Arc::new(bridge);

    let workers: Vec<_> = (0..4)
        .map(|worker| {
            let bridge = Arc::clone(&bridge);
            std::thread::spawn(move || {
                for i in 0..50 {
                    let name = format!("w{worker}_{i}");
                    let node = bridge
                        .call("CreateIdentifier1", [WireValue::handle(ctx), name.as_str().into()])
                        .unwrap();
                    let out = bridge
                        .call("IdentifierNameConst", [WireValue::handle(ctx), node])
                        .unwrap()
                        .as_owned_string()
                        .unwrap();
                    assert_eq!(bridge.string(out).unwrap(), name);
                    bridge.release(out.into()).unwrap();
                }
            })
        })
        .collect();

    for worker in workers {
        worker.join().unwrap();
    }
    assert_eq!(bridge.stats().calls_made, 400);
    assert_eq!(bridge.resource_stats().live_strings, 0);
}
