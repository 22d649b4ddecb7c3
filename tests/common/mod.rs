//! Helpers shared by the integration tests.

#![allow(dead_code)]

use livevars::ops::{IntCC, Opcode};
use livevars::{Block, FunctionBody, InstData, Module, Operand, Value};
use proptest::prelude::*;

/// Parse `text` and return its only function.
pub fn parse_one(text: &str) -> FunctionBody {
    let _ = env_logger::try_init();
    let module = Module::from_text(text).unwrap();
    assert_eq!(module.funcs.len(), 1);
    let body = module.funcs.values().next().unwrap().clone();
    body
}

pub fn block(body: &FunctionBody, name: &str) -> Block {
    body.blocks
        .entries()
        .find(|(_, def)| def.name == name)
        .map(|(block, _)| block)
        .unwrap()
}

/// The value named `%name`.
pub fn value(body: &FunctionBody, name: &str) -> Value {
    body.values
        .iter()
        .find(|&value| body.value_name(value) == Some(name))
        .unwrap()
}

/// Sorted `%name`s of a set of values.
pub fn names(body: &FunctionBody, values: impl IntoIterator<Item = Value>) -> Vec<String> {
    let mut names = values
        .into_iter()
        .map(|value| body.value_ref(value).to_string())
        .collect::<Vec<_>>();
    names.sort();
    names
}

/// The shape of a random function: each block's instructions pick an
/// opcode and two operands by index into all definable values (one
/// past the end picks a constant), then branch to some blocks.
#[derive(Clone, Debug)]
pub struct FuncShape {
    pub num_args: usize,
    pub blocks: Vec<BlockShape>,
}

#[derive(Clone, Debug)]
pub struct BlockShape {
    pub insts: Vec<(u8, usize, usize)>,
    pub targets: Vec<usize>,
    pub ret_use: usize,
}

const STORE: u8 = 4;

pub fn func_shape() -> impl Strategy<Value = FuncShape> {
    (0usize..3, 1usize..8).prop_flat_map(|(num_args, num_blocks)| {
        let block = (
            prop::collection::vec((0u8..=STORE, any::<usize>(), any::<usize>()), 0..4),
            prop::collection::vec(0..num_blocks, 0..4),
            any::<usize>(),
        )
            .prop_map(|(insts, targets, ret_use)| BlockShape {
                insts,
                targets,
                ret_use,
            });
        prop::collection::vec(block, num_blocks)
            .prop_map(move |blocks| FuncShape { num_args, blocks })
    })
}

fn operand(values: &[Value], pick: usize) -> Operand {
    let i = pick % (values.len() + 1);
    if i == values.len() {
        Operand::from((pick % 7) as i64)
    } else {
        Operand::from(values[i])
    }
}

/// Build a well-formed function from `shape`. Any instruction may use
/// any value, defined earlier, later or in another block.
pub fn build(shape: &FuncShape) -> FunctionBody {
    let mut body = FunctionBody::new("random");
    for _ in 1..shape.blocks.len() {
        body.add_block();
    }
    for i in 0..shape.num_args {
        let arg = body.add_arg();
        body.set_value_name(arg, &format!("a{}", i));
    }
    let blocks = body.blocks.iter().collect::<Vec<_>>();

    let results = shape
        .blocks
        .iter()
        .map(|b| {
            b.insts
                .iter()
                .map(|&(op, _, _)| (op != STORE).then(|| body.add_placeholder()))
                .collect::<Vec<_>>()
        })
        .collect::<Vec<_>>();
    let values = body
        .args
        .iter()
        .copied()
        .chain(results.iter().flatten().flatten().copied())
        .collect::<Vec<_>>();

    for ((b, &block), row) in shape.blocks.iter().zip(&blocks).zip(&results) {
        for (&(op, x, y), &result) in b.insts.iter().zip(row) {
            let (x, y) = (operand(&values, x), operand(&values, y));
            let data = match op {
                0 => InstData::new(Opcode::Add, vec![x, y], true),
                1 => InstData::new(Opcode::Mul, vec![x, y], true),
                2 => InstData::new(Opcode::Load, vec![x], true),
                3 => InstData::new(Opcode::ICmp(IntCC::Slt), vec![x, y], true),
                _ => InstData::new(Opcode::Store, vec![x, y], false),
            };
            match result {
                Some(value) => {
                    body.define_placeholder(value, data);
                    body.append_to_block(block, value);
                }
                None => {
                    body.add_inst(block, data);
                }
            }
        }

        let targets = b
            .targets
            .iter()
            .map(|&t| Operand::from(blocks[t]))
            .collect::<Vec<_>>();
        let cond = operand(&values, b.ret_use);
        let term = match targets.len() {
            0 => InstData::new(Opcode::Ret, vec![cond], false),
            1 => InstData::new(Opcode::Br, targets, false),
            2 => InstData::new(Opcode::Br, std::iter::once(cond).chain(targets), false),
            _ => {
                let mut args = vec![cond, targets[0].clone()];
                for (i, target) in targets[1..].iter().enumerate() {
                    args.push(Operand::from(i as i64));
                    args.push(target.clone());
                }
                InstData::new(Opcode::Switch, args, false)
            }
        };
        body.add_inst(block, term);
    }

    body.recompute_edges();
    body.validate().unwrap();
    body
}
