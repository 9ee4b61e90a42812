use half::f16;
use modelbridge_tensor::ScalarKind;

/// Elementwise arithmetic over the numeric scalar kinds. Integer kinds wrap on overflow.
pub(crate) trait Numeric: bytemuck::Pod {
    fn from_f64(value: f64) -> Self;
    fn add(self, other: Self) -> Self;
    fn mul(self, other: Self) -> Self;
}

macro_rules! impl_int {
    ($($ty:ty),*) => {
        $(
            impl Numeric for $ty {
                fn from_f64(value: f64) -> Self {
                    value as $ty
                }
                fn add(self, other: Self) -> Self {
                    self.wrapping_add(other)
                }
                fn mul(self, other: Self) -> Self {
                    self.wrapping_mul(other)
                }
            }
        )*
    };
}

macro_rules! impl_float {
    ($($ty:ty),*) => {
        $(
            impl Numeric for $ty {
                fn from_f64(value: f64) -> Self {
                    value as $ty
                }
                fn add(self, other: Self) -> Self {
                    self + other
                }
                fn mul(self, other: Self) -> Self {
                    self * other
                }
            }
        )*
    };
}

impl_int!(u8, i8, i16, i32, i64);
impl_float!(f32, f64);

impl Numeric for f16 {
    fn from_f64(value: f64) -> Self {
        f16::from_f64(value)
    }
    fn add(self, other: Self) -> Self {
        self + other
    }
    fn mul(self, other: Self) -> Self {
        self * other
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum BinaryOp {
    Add,
    Mul,
}

fn zip_typed<T: Numeric>(lhs: &[u8], rhs: &[u8], op: BinaryOp) -> Vec<u8> {
    let lhs: Vec<T> = bytemuck::pod_collect_to_vec(lhs);
    let rhs: Vec<T> = bytemuck::pod_collect_to_vec(rhs);
    let out: Vec<T> = lhs
        .into_iter()
        .zip(rhs)
        .map(|(l, r)| match op {
            BinaryOp::Add => l.add(r),
            BinaryOp::Mul => l.mul(r),
        })
        .collect();
    bytemuck::cast_slice(&out).to_vec()
}

/// Applies `op` to two equally sized buffers of `kind`. Booleans use or/and.
pub(crate) fn zip_bytes(kind: ScalarKind, lhs: &[u8], rhs: &[u8], op: BinaryOp) -> Vec<u8> {
    match kind {
        ScalarKind::UInt8 => zip_typed::<u8>(lhs, rhs, op),
        ScalarKind::Int8 => zip_typed::<i8>(lhs, rhs, op),
        ScalarKind::Int16 => zip_typed::<i16>(lhs, rhs, op),
        ScalarKind::Int32 => zip_typed::<i32>(lhs, rhs, op),
        ScalarKind::Int64 => zip_typed::<i64>(lhs, rhs, op),
        ScalarKind::Float16 => zip_typed::<f16>(lhs, rhs, op),
        ScalarKind::Float32 => zip_typed::<f32>(lhs, rhs, op),
        ScalarKind::Float64 => zip_typed::<f64>(lhs, rhs, op),
        ScalarKind::Bool => lhs
            .iter()
            .zip(rhs)
            .map(|(&l, &r)| match op {
                BinaryOp::Add => ((l != 0) || (r != 0)) as u8,
                BinaryOp::Mul => ((l != 0) && (r != 0)) as u8,
            })
            .collect(),
    }
}

fn encode_typed<T: Numeric>(values: &[f64]) -> Vec<u8> {
    let out: Vec<T> = values.iter().map(|&v| T::from_f64(v)).collect();
    bytemuck::cast_slice(&out).to_vec()
}

/// Encodes literal values at the native width of `kind`.
pub(crate) fn encode_values(kind: ScalarKind, values: &[f64]) -> Vec<u8> {
    match kind {
        ScalarKind::UInt8 => encode_typed::<u8>(values),
        ScalarKind::Int8 => encode_typed::<i8>(values),
        ScalarKind::Int16 => encode_typed::<i16>(values),
        ScalarKind::Int32 => encode_typed::<i32>(values),
        ScalarKind::Int64 => encode_typed::<i64>(values),
        ScalarKind::Float16 => encode_typed::<f16>(values),
        ScalarKind::Float32 => encode_typed::<f32>(values),
        ScalarKind::Float64 => encode_typed::<f64>(values),
        ScalarKind::Bool => values.iter().map(|&v| (v != 0.0) as u8).collect(),
    }
}
