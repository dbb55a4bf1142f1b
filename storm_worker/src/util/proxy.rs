use reqwest::RequestBuilder;
use url::Url;

/// Routes a GET through a pass-through proxy that takes the real target in
/// its `url` query parameter, or goes direct when no proxy is configured.
pub fn auto_proxy(client: &reqwest::Client, full_url: &Url, proxy: Option<&Url>) -> RequestBuilder {
    client.get(proxied_url(full_url, proxy))
}

pub(crate) fn proxied_url(full_url: &Url, proxy: Option<&Url>) -> Url {
    match proxy {
        Some(proxy) => {
            let mut proxy = proxy.clone();
            proxy.query_pairs_mut().append_pair("url", full_url.as_str());
            proxy
        }
        None => full_url.clone(),
    }
}
