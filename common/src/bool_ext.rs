pub trait BoolExt {
    fn then_else<T>(self, on_true: T, on_false: T) -> T;
    fn then_else_with<T, F1, F2>(self, on_true: F1, on_false: F2) -> T
    where
        F1: FnOnce() -> T,
        F2: FnOnce() -> T;
}

impl BoolExt for bool {
    fn then_else<T>(self, on_true: T, on_false: T) -> T {
        if self { on_true } else { on_false }
    }

    fn then_else_with<T, F1, F2>(self, on_true: F1, on_false: F2) -> T
    where
        F1: FnOnce() -> T,
        F2: FnOnce() -> T,
    {
        if self { on_true() } else { on_false() }
    }
}
