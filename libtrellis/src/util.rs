use std::ops::{AddAssign, Div, DivAssign};

#[cfg(test)]
#[ctor::ctor]
fn init_backtrace() {
    color_backtrace::install();
}

pub trait Float: PartialOrd + Copy + Div<Output = Self> + AddAssign + DivAssign {
    fn from_usize(n: usize) -> Self;
}

impl Float for f64 {
    fn from_usize(n: usize) -> Self {
        n as f64
    }
}

pub trait VecMath<T>
where
    T: Float,
{
    fn total(&self) -> T;
    fn normalize_or_uniform(&mut self) -> bool;
}

impl<T> VecMath<T> for Vec<T>
where
    T: Float,
{
    fn total(&self) -> T {
        let mut sum = T::from_usize(0);
        self.iter().for_each(|&item| sum += item);
        sum
    }

    /// Scale the vector so that it sums to one. A vector that sums to zero
    /// is replaced with the uniform distribution, and `true` is returned.
    fn normalize_or_uniform(&mut self) -> bool {
        let sum = self.total();

        if sum == T::from_usize(0) {
            let uniform = T::from_usize(1) / T::from_usize(self.len());
            self.iter_mut().for_each(|item| *item = uniform);
            true
        } else {
            self.iter_mut().for_each(|item| *item /= sum);
            false
        }
    }
}
