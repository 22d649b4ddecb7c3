//! Fuzzing-specific utilities.

use crate::ir::*;
use crate::ops::Opcode;
use libfuzzer_sys::arbitrary::{self, Unstructured};

const MAX_BLOCKS: u32 = 12;
const MAX_INSTS_PER_BLOCK: usize = 4;
const MAX_ARGS: usize = 3;

/// A well-formed function with an arbitrary CFG (loops, irreducible
/// regions and unreachable blocks included) and arbitrary uses of
/// values across blocks.
#[derive(Debug)]
pub struct ArbitraryFunction(pub FunctionBody);

fn operand(u: &mut Unstructured<'_>, values: &[Value]) -> arbitrary::Result<Operand> {
    if values.is_empty() || u.ratio(1, 5)? {
        Ok(Operand::from(i64::from(u.int_in_range(0..=100u8)?)))
    } else {
        Ok(Operand::from(*u.choose(values)?))
    }
}

impl<'a> arbitrary::Arbitrary<'a> for ArbitraryFunction {
    fn arbitrary(u: &mut Unstructured<'a>) -> arbitrary::Result<Self> {
        let mut body = FunctionBody::new("fuzz");
        let num_blocks = u.int_in_range(1..=MAX_BLOCKS)?;
        for _ in 1..num_blocks {
            body.add_block();
        }
        for _ in 0..u.int_in_range(0..=MAX_ARGS)? {
            body.add_arg();
        }

        // Results are created up front so that any instruction may use
        // any value, including ones defined later or in other blocks.
        let mut placed = vec![];
        for block in body.blocks.iter() {
            for _ in 0..u.int_in_range(0..=MAX_INSTS_PER_BLOCK)? {
                placed.push((block, body.add_placeholder()));
            }
        }
        let values = body
            .args
            .iter()
            .copied()
            .chain(placed.iter().map(|&(_, value)| value))
            .collect::<Vec<_>>();

        let opcodes = [Opcode::Add, Opcode::Mul, Opcode::Load, Opcode::Freeze];
        for &(block, value) in &placed {
            let opcode = u.choose(&opcodes)?;
            let args = match opcode {
                Opcode::Add | Opcode::Mul => vec![operand(u, &values)?, operand(u, &values)?],
                _ => vec![operand(u, &values)?],
            };
            body.define_placeholder(value, InstData::new(opcode.clone(), args, true));
            body.append_to_block(block, value);
        }

        for block in body.blocks.iter().collect::<Vec<_>>() {
            let mut targets = vec![];
            for _ in 0..u.int_in_range(0..=3u8)? {
                targets.push(Block::from(u.int_in_range(0..=num_blocks - 1)?));
            }
            let data = match targets.len() {
                0 => InstData::new(Opcode::Ret, vec![operand(u, &values)?], false),
                1 => InstData::new(Opcode::Br, vec![Operand::from(targets[0])], false),
                2 => InstData::new(
                    Opcode::Br,
                    vec![
                        operand(u, &values)?,
                        targets[0].into(),
                        targets[1].into(),
                    ],
                    false,
                ),
                _ => {
                    let mut args = vec![operand(u, &values)?, targets[0].into()];
                    for (i, &target) in targets[1..].iter().enumerate() {
                        args.push(Operand::from(i as i64));
                        args.push(target.into());
                    }
                    InstData::new(Opcode::Switch, args, false)
                }
            };
            body.add_inst(block, data);
        }

        body.recompute_edges();
        Ok(ArbitraryFunction(body))
    }
}
