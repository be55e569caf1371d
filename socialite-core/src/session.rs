use std::collections::HashMap;

/// Session key under which the anti-forgery state is stored.
pub const STATE_KEY: &str = "state";

/// The slice of a web session the flow needs: storing the `state` value
/// between the redirect and the callback.
pub trait SessionStore: Send + Sync {
    /// Read a session value.
    fn get(&self, key: &str) -> Option<String>;
    /// Write a session value.
    fn set(&mut self, key: &str, value: String);
}

/// Access to the query parameters of the inbound callback request.
pub trait CallbackRequest: Send + Sync {
    /// Read a query parameter.
    fn get(&self, name: &str) -> Option<String>;
}

impl SessionStore for HashMap<String, String> {
    fn get(&self, key: &str) -> Option<String> {
        HashMap::get(self, key).cloned()
    }

    fn set(&mut self, key: &str, value: String) {
        self.insert(key.to_string(), value);
    }
}

impl CallbackRequest for HashMap<String, String> {
    fn get(&self, name: &str) -> Option<String> {
        HashMap::get(self, name).cloned()
    }
}

impl<'a, const N: usize> CallbackRequest for [(&'a str, &'a str); N] {
    fn get(&self, name: &str) -> Option<String> {
        self.iter()
            .find(|(key, _)| *key == name)
            .map(|(_, value)| value.to_string())
    }
}
