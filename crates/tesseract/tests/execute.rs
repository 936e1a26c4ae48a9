mod common;

use tesseract::{Color, Uniforms};

use common::{close, context};

#[test]
fn map_index_1d() {
    let Some(ctx) = context() else { return };
    let mut output = ctx.create_float1d(8).unwrap();
    let program = ctx.create_program("[float] thread (int x) { thread[0] = float(x); }").unwrap();

    program.execute(&[output.binding()], &Uniforms::new()).unwrap();
    output.pull().unwrap();

    for i in 0..8 {
        assert_eq!(output.get(i), i as f32);
    }
}

#[test]
fn map_index_2d() {
    let Some(ctx) = context() else { return };
    let mut output = ctx.create_float2d(5, 3).unwrap();
    let program = ctx
        .create_program("[float] thread (int x, int y) { thread[0] = float(x + y * 10); }")
        .unwrap();

    program.execute(&[output.binding()], &Uniforms::new()).unwrap();
    output.pull().unwrap();

    for y in 0..3 {
        for x in 0..5 {
            assert_eq!(output.get((x, y)), (x + y * 10) as f32, "({x}, {y})");
        }
    }
}

#[test]
fn map_index_3d_uses_logical_extents() {
    let Some(ctx) = context() else { return };
    let mut output = ctx.create_float3d(3, 2, 4).unwrap();
    let program = ctx
        .create_program(
            "[float] thread (int x, int y, int z) {\n\
             thread[0] = float(x + 10 * y + 100 * z + 1000 * thread.depth);\n\
             }",
        )
        .unwrap();

    program.execute(&[output.binding()], &Uniforms::new()).unwrap();
    output.pull().unwrap();

    for z in 0..4 {
        for y in 0..2 {
            for x in 0..3 {
                assert_eq!(output.get((x, y, z)), (x + 10 * y + 100 * z + 4000) as f32);
            }
        }
    }
}

#[test]
fn copy_float_buffer() {
    let Some(ctx) = context() else { return };
    let values = [0.0, 1.0, -1.0, 0.5, 345.0, -2.75, 0.1, 12_345.678, -3.0e38, 1.0e-20];
    let mut input = ctx.create_float1d(values.len()).unwrap();
    input.map(|i| values[i]).push();
    let mut output = ctx.create_float1d(values.len()).unwrap();

    let program = ctx
        .create_program("uniform Float1D input;\n[float] thread (int x) { thread[0] = input[x]; }")
        .unwrap();
    program
        .execute(&[output.binding()], &Uniforms::new().buffer("input", input.binding()))
        .unwrap();
    output.pull().unwrap();

    for (i, &v) in values.iter().enumerate() {
        assert!(close(output.get(i), v), "{i}: {} != {v}", output.get(i));
    }
}

#[test]
fn copy_to_several_outputs() {
    let Some(ctx) = context() else { return };
    let mut src = ctx.create_color2d(4, 3).unwrap();
    src.map(|(x, y)| [x as u8 * 60, y as u8 * 100, 7, 255]).push();
    let mut colors = ctx.create_color2d(4, 3).unwrap();
    let mut products = ctx.create_float2d(4, 3).unwrap();

    let program = ctx
        .create_program(
            "uniform Color2D src;\n\
             [color, float] thread (int x, int y) {\n\
                 thread[0] = src[x][y];\n\
                 thread[1] = float(x * y) + float(src.width);\n\
             }",
        )
        .unwrap();
    program
        .execute(
            &[colors.binding(), products.binding()],
            &Uniforms::new().buffer("src", src.binding()),
        )
        .unwrap();
    colors.pull().unwrap();
    products.pull().unwrap();

    assert_eq!(colors.data(), src.data());
    for y in 0..3 {
        for x in 0..4 {
            assert_eq!(products.get((x, y)), (x * y + 4) as f32);
        }
    }
}

#[test]
fn scalar_uniforms() {
    let Some(ctx) = context() else { return };
    let mut output = ctx.create_float1d(6).unwrap();
    let program = ctx
        .create_program(
            "uniform int offset;\nuniform float scale;\n\
             [float] thread (int x) { thread[0] = float(x + offset) * scale; }",
        )
        .unwrap();

    program
        .execute(&[output.binding()], &Uniforms::new().int("offset", 3).float("scale", 0.5))
        .unwrap();
    output.pull().unwrap();

    for i in 0..6 {
        assert_eq!(output.get(i), (i as f32 + 3.0) * 0.5);
    }
}

#[test]
fn unsupplied_uniforms_read_zero() {
    let Some(ctx) = context() else { return };
    let mut output = ctx.create_float1d(4).unwrap();
    let program = ctx
        .create_program("uniform int n;\nuniform Float1D v;\n[float] thread (int x) { thread[0] = float(n + v.width + x); }")
        .unwrap();

    program.execute(&[output.binding()], &Uniforms::new()).unwrap();
    output.pull().unwrap();

    assert_eq!(output.data(), &[0.0, 1.0, 2.0, 3.0]);
}

#[test]
fn reduce_over_depth() {
    let Some(ctx) = context() else { return };
    let mut volume = ctx.create_float3d(3, 2, 5).unwrap();
    volume.map(|(x, y, z)| (x + y * 3) as f32 * (z + 1) as f32).push();
    let mut sums = ctx.create_float2d(3, 2).unwrap();

    let program = ctx
        .create_program(
            "uniform Float3D volume;\n\
             [float] thread (int x, int y) {\n\
                 float total = 0.0;\n\
                 for (int z = 0; z < volume.depth; z++) {\n\
                     total += volume[x][y][z];\n\
                 }\n\
                 thread[0] = total;\n\
             }",
        )
        .unwrap();
    program
        .execute(&[sums.binding()], &Uniforms::new().buffer("volume", volume.binding()))
        .unwrap();
    sums.pull().unwrap();

    for y in 0..2 {
        for x in 0..3 {
            assert_eq!(sums.get((x, y)), (x + y * 3) as f32 * 15.0);
        }
    }
}

#[test]
fn push_and_pull_sync_the_mirror() {
    let Some(ctx) = context() else { return };
    let mut buffer = ctx.create_color1d(5).unwrap();
    buffer.set(2, [1, 2, 3, 4]);
    assert_eq!(buffer.get(2), [1, 2, 3, 4]);

    // Without a push the texture still holds zeros.
    buffer.pull().unwrap();
    let zero: Color = [0; 4];
    assert!(buffer.data().iter().all(|&c| c == zero));

    buffer.set(2, [1, 2, 3, 4]).push();
    buffer.pull().unwrap();
    assert_eq!(buffer.get(2), [1, 2, 3, 4]);
}

#[test]
fn copy_extreme_floats() {
    let Some(ctx) = context() else { return };
    let values = [2.0e38, -2.0e38, f32::MAX, f32::MIN, -1.8e38, 1.5e-38, f32::MIN_POSITIVE, -f32::MIN_POSITIVE];
    let mut input = ctx.create_float1d(values.len()).unwrap();
    input.map(|i| values[i]).push();
    let mut output = ctx.create_float1d(values.len()).unwrap();

    let program = ctx
        .create_program("uniform Float1D input;\n[float] thread (int x) { thread[0] = input[x]; }")
        .unwrap();
    program
        .execute(&[output.binding()], &Uniforms::new().buffer("input", input.binding()))
        .unwrap();
    output.pull().unwrap();

    assert_eq!(output.data(), &values);
}

#[test]
fn indices_past_float_precision() {
    let Some(ctx) = context() else { return };
    let len = (1 << 24) + 4100;
    let mut src = ctx.create_color1d(len).unwrap();
    src.map(|i| [i as u8, (i >> 8) as u8, (i >> 16) as u8, 255]).push();
    let mut dst = ctx.create_color1d(len).unwrap();

    let program = ctx
        .create_program("uniform Color1D src;\n[color] thread (int x) { thread[0] = src[x]; }")
        .unwrap();
    program
        .execute(&[dst.binding()], &Uniforms::new().buffer("src", src.binding()))
        .unwrap();
    dst.pull().unwrap();

    assert_eq!(dst.get(len - 1), src.get(len - 1));
    assert!(dst.data() == src.data());
}

#[test]
fn many_scalar_uniforms_share_one_block() {
    let Some(ctx) = context() else { return };
    let decls: String = (0..16).map(|k| format!("uniform int n{k};\n")).collect();
    let sum = (0..16).map(|k| format!("n{k}")).collect::<Vec<_>>().join(" + ");
    let program = ctx
        .create_program(&format!("{decls}[float] thread (int x) {{ thread[0] = float({sum} + x); }}"))
        .unwrap();

    let uniforms = (0..16).fold(Uniforms::new(), |u, k| u.int(&format!("n{k}"), k));
    let mut output = ctx.create_float1d(4).unwrap();
    program.execute(&[output.binding()], &uniforms).unwrap();
    output.pull().unwrap();

    assert_eq!(output.data(), &[120.0, 121.0, 122.0, 123.0]);
}
