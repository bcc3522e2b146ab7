use std::rc::Rc;

/// Where the app currently is, and how to force it somewhere else.
pub trait Navigator {
    fn current_path(&self) -> String;
    fn redirect(&self, path: &str);
}

impl<N: Navigator + ?Sized> Navigator for &N {
    fn current_path(&self) -> String {
        (**self).current_path()
    }

    fn redirect(&self, path: &str) {
        (**self).redirect(path)
    }
}

impl<N: Navigator + ?Sized> Navigator for Rc<N> {
    fn current_path(&self) -> String {
        (**self).current_path()
    }

    fn redirect(&self, path: &str) {
        (**self).redirect(path)
    }
}
