#![allow(dead_code)]

pub mod fixtures {
    use std::io::Read;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use brrtbind::capability::{decode_json, encode_json, BodyDecoder, Handler, ResponseEncoder};
    use brrtbind::response::ResponseWriter;
    use brrtbind::{Params, RequestObject};
    use http::StatusCode;
    use opentelemetry::Context;
    use serde::{Deserialize, Serialize};

    #[derive(Debug, Clone, Default, Params)]
    pub struct ItemPath {
        #[param(rename = "ID", example = "5")]
        pub id: i64,
    }

    #[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
    pub struct Item {
        pub id: i64,
        pub name: String,
    }

    /// `GET /items/{ID}`; id 13 fails in the handler after the response was set.
    #[derive(Debug, Clone, Default, RequestObject)]
    pub struct GetItem {
        #[request(example = "/items/5")]
        pub path: ItemPath,
        pub response: Option<Item>,
    }

    impl Handler for GetItem {
        fn handle(&mut self, _ctx: &Context, _out: &mut ResponseWriter) -> anyhow::Result<()> {
            self.response = Some(Item {
                id: self.path.id,
                name: format!("item-{}", self.path.id),
            });
            if self.path.id == 13 {
                anyhow::bail!("item 13 is cursed");
            }
            Ok(())
        }

        fn handle_error(&mut self, _ctx: &Context, out: &mut ResponseWriter, err: anyhow::Error) {
            out.set_status(StatusCode::SERVICE_UNAVAILABLE);
            encode_json(out, &serde_json::json!({ "handler_error": err.to_string() }));
        }
    }

    impl ResponseEncoder for GetItem {
        fn encode_response(&self, out: &mut ResponseWriter, response: &Item) {
            encode_json(out, response);
        }
    }

    #[derive(Debug, Clone, Default, Params)]
    pub struct SearchQuery {
        pub name: String,
        pub tags: Vec<String>,
        pub limit: Option<u32>,
        #[param(example = "true")]
        pub exact: bool,
    }

    /// `GET /search`; echoes what was bound.
    #[derive(Debug, Clone, Default, RequestObject)]
    pub struct Search {
        pub query: SearchQuery,
    }

    impl Handler for Search {
        fn handle(&mut self, _ctx: &Context, out: &mut ResponseWriter) -> anyhow::Result<()> {
            out.write_json(&serde_json::json!({
                "name": self.query.name,
                "tags": self.query.tags,
                "limit": self.query.limit,
                "exact": self.query.exact,
            }))?;
            Ok(())
        }

        fn handle_error(&mut self, _ctx: &Context, _out: &mut ResponseWriter, _err: anyhow::Error) {
        }
    }

    #[derive(Debug, Clone, Default, Params)]
    pub struct DryRun {
        pub dry: bool,
    }

    /// `PUT /items/{ID}`; counts body decoder calls on the template.
    #[derive(Debug, Clone, Default, RequestObject)]
    pub struct UpdateItem {
        #[request(example = "/items/5")]
        pub path: ItemPath,
        pub query: DryRun,
        pub body: Option<Item>,
        pub response: Item,
        pub decodes: Arc<AtomicUsize>,
    }

    impl UpdateItem {
        pub fn decode_count(&self) -> usize {
            self.decodes.load(Ordering::SeqCst)
        }
    }

    impl Handler for UpdateItem {
        fn handle(&mut self, _ctx: &Context, _out: &mut ResponseWriter) -> anyhow::Result<()> {
            let body = self.body.take().unwrap_or_default();
            self.response = Item {
                id: self.path.id,
                name: body.name,
            };
            Ok(())
        }

        fn handle_error(&mut self, _ctx: &Context, _out: &mut ResponseWriter, _err: anyhow::Error) {
        }
    }

    impl BodyDecoder for UpdateItem {
        fn decode_body(&self, body: &mut dyn Read, target: &mut Item) -> anyhow::Result<()> {
            self.decodes.fetch_add(1, Ordering::SeqCst);
            decode_json(body, target)
        }
    }

    impl ResponseEncoder for UpdateItem {
        fn encode_response(&self, out: &mut ResponseWriter, response: &Item) {
            encode_json(out, response);
        }
    }
}

pub mod spans {
    use opentelemetry::trace::TracerProvider as _;
    use opentelemetry_sdk::trace::{InMemorySpanExporter, SdkTracer, SdkTracerProvider, SpanData};

    /// Tracer whose finished spans can be inspected.
    pub struct TestTracing {
        exporter: InMemorySpanExporter,
        provider: SdkTracerProvider,
    }

    impl TestTracing {
        pub fn init() -> Self {
            let exporter = InMemorySpanExporter::default();
            let provider = SdkTracerProvider::builder()
                .with_simple_exporter(exporter.clone())
                .build();
            Self { exporter, provider }
        }

        pub fn tracer(&self) -> SdkTracer {
            self.provider.tracer(brrtbind::otel::TRACER_NAME)
        }

        pub fn spans(&self) -> Vec<SpanData> {
            self.exporter.get_finished_spans().unwrap()
        }
    }

    /// String attributes of `span` as `(key, value)` pairs.
    pub fn attributes(span: &SpanData) -> Vec<(String, String)> {
        span.attributes
            .iter()
            .map(|kv| (kv.key.as_str().to_string(), kv.value.as_str().into_owned()))
            .collect()
    }
}

pub mod requests {
    use brrtbind::router::ParamVec;
    use std::io::Cursor;
    use std::sync::Arc;

    pub fn get(uri: &str) -> http::Request<Cursor<Vec<u8>>> {
        http::Request::get(uri).body(Cursor::new(Vec::new())).unwrap()
    }

    pub fn put(uri: &str, body: &str) -> http::Request<Cursor<Vec<u8>>> {
        http::Request::put(uri)
            .body(Cursor::new(body.as_bytes().to_vec()))
            .unwrap()
    }

    pub fn params(pairs: &[(&str, &str)]) -> ParamVec {
        pairs
            .iter()
            .map(|(k, v)| (Arc::from(*k), (*v).to_string()))
            .collect()
    }

    pub fn json_body(response: &http::Response<Vec<u8>>) -> serde_json::Value {
        serde_json::from_slice(response.body()).unwrap()
    }
}
