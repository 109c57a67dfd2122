// Integration tests for the consume loop.
//
// An in-memory transport replays scripted batches and records every reply, so
// the loop can be driven without a network.

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::oneshot;
use weatherbot::bot::RunStats;
use weatherbot::dispatch::messages;
use weatherbot::telegram::{ChatTransport, TransportError};
use weatherbot::weather::{WeatherError, WeatherProvider, WeatherSnapshot};
use weatherbot::{
    Bot, Coordinate, Dispatcher, InboundEvent, LocationStore, OutboundReply, RateLimiter, UserId,
};

// ── Test transport & provider ─────────────────────────────────────────────────

struct ScriptedTransport {
    batches: Mutex<VecDeque<Result<Vec<InboundEvent>, TransportError>>>,
    sent: Mutex<Vec<OutboundReply>>,
    /// Users whose replies fail to send
    undeliverable: Vec<UserId>,
    drained: Mutex<Option<oneshot::Sender<()>>>,
}

impl ScriptedTransport {
    fn new(
        batches: Vec<Result<Vec<InboundEvent>, TransportError>>,
        undeliverable: Vec<UserId>,
    ) -> (Arc<Self>, oneshot::Receiver<()>) {
        let (tx, rx) = oneshot::channel();
        let transport = Arc::new(Self {
            batches: Mutex::new(batches.into()),
            sent: Mutex::new(Vec::new()),
            undeliverable,
            drained: Mutex::new(Some(tx)),
        });
        (transport, rx)
    }

    fn sent(&self) -> Vec<OutboundReply> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl ChatTransport for ScriptedTransport {
    async fn receive(&self) -> Result<Vec<InboundEvent>, TransportError> {
        let next = self.batches.lock().unwrap().pop_front();
        match next {
            Some(batch) => batch,
            None => {
                if let Some(tx) = self.drained.lock().unwrap().take() {
                    let _ = tx.send(());
                }
                std::future::pending().await
            }
        }
    }

    async fn send(&self, reply: &OutboundReply) -> Result<(), TransportError> {
        if self.undeliverable.contains(&reply.user) {
            return Err(TransportError::Api {
                code: Some(403),
                description: "Forbidden: bot was blocked by the user".to_string(),
            });
        }
        self.sent.lock().unwrap().push(reply.clone());
        Ok(())
    }
}

struct StaticWeather;

#[async_trait]
impl WeatherProvider for StaticWeather {
    async fn fetch(&self, _coordinate: Coordinate) -> Result<WeatherSnapshot, WeatherError> {
        Ok(WeatherSnapshot {
            timezone: "UTC".to_string(),
            temperature: 15.0,
            humidity: 50,
            pressure: 1013,
            wind_speed: 1.0,
            description: None,
        })
    }
}

fn bot(transport: Arc<ScriptedTransport>, limit: u32) -> Bot {
    let dispatcher = Dispatcher::new(
        Arc::new(RateLimiter::new(limit)),
        Arc::new(LocationStore::new()),
        Arc::new(StaticWeather),
    );
    Bot::new(transport, dispatcher, Duration::from_millis(10))
}

async fn run(bot: &Bot, drained: oneshot::Receiver<()>) -> RunStats {
    tokio::time::timeout(
        Duration::from_secs(5),
        bot.run_until(async {
            let _ = drained.await;
        }),
    )
    .await
    .expect("bot did not stop after the script was drained")
}

// ── Tests ─────────────────────────────────────────────────────────────────────

/// Every event gets exactly one reply, in order, addressed to its sender.
#[tokio::test]
async fn test_one_reply_per_event() {
    let alice = UserId(1);
    let bob = UserId(2);
    let events = vec![
        InboundEvent::text(alice, "/start"),
        InboundEvent::text(bob, "/setlocation(1.5,2.5)"),
        InboundEvent::location(alice, Coordinate::new(3.0, 4.0).unwrap()),
        InboundEvent::text(bob, "/status"),
        InboundEvent::text(alice, "xyz"),
    ];
    let (transport, drained) = ScriptedTransport::new(vec![Ok(events.clone())], vec![]);
    let bot = bot(Arc::clone(&transport), 10);

    let stats = run(&bot, drained).await;

    let sent = transport.sent();
    assert_eq!(sent.len(), events.len());
    assert_eq!(stats.handled, events.len() as u64);
    for (event, reply) in events.iter().zip(&sent) {
        assert_eq!(reply.user, event.user);
    }
    assert_eq!(sent[0].text, messages::GREETING);
    assert_eq!(sent[1].text, "Default location set to (1.500000, 2.500000)");
    assert!(sent[2].text.starts_with("Weather in your current location:"));
    assert!(sent[3].text.contains("(1.500000, 2.500000)"));
    assert_eq!(sent[4].text, messages::DONT_KNOW);
}

/// A failed send is logged and the loop carries on with the next event.
#[tokio::test]
async fn test_send_failure_does_not_stop_loop() {
    let blocked = UserId(66);
    let ok = UserId(77);
    let batches = vec![
        Ok(vec![InboundEvent::text(blocked, "/start")]),
        Ok(vec![InboundEvent::text(ok, "/help")]),
    ];
    let (transport, drained) = ScriptedTransport::new(batches, vec![blocked]);
    let bot = bot(Arc::clone(&transport), 10);

    let stats = run(&bot, drained).await;

    assert_eq!(stats.handled, 2);
    assert_eq!(stats.send_failures, 1);
    let sent = transport.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].user, ok);
    assert_eq!(sent[0].text, messages::HELP);
}

/// Receive errors are retried after the configured delay.
#[tokio::test]
async fn test_receive_failure_is_retried() {
    let user = UserId(5);
    let batches = vec![
        Err(TransportError::Request("connection reset".to_string())),
        Ok(vec![]),
        Ok(vec![InboundEvent::text(user, "/start")]),
    ];
    let (transport, drained) = ScriptedTransport::new(batches, vec![]);
    let bot = bot(Arc::clone(&transport), 10);

    let stats = run(&bot, drained).await;

    assert_eq!(stats.receive_failures, 1);
    assert_eq!(stats.handled, 1);
    assert_eq!(transport.sent(), vec![OutboundReply::new(user, messages::GREETING)]);
}

/// Throttled events still get their one (rate-limit) reply.
#[tokio::test]
async fn test_throttled_events_are_answered() {
    let user = UserId(9);
    let events: Vec<_> = (0..4).map(|_| InboundEvent::text(user, "/start")).collect();
    let (transport, drained) = ScriptedTransport::new(vec![Ok(events)], vec![]);
    let bot = bot(Arc::clone(&transport), 2);

    run(&bot, drained).await;

    let texts: Vec<_> = transport.sent().into_iter().map(|r| r.text).collect();
    assert_eq!(
        texts,
        vec![
            messages::GREETING.to_string(),
            messages::GREETING.to_string(),
            messages::rate_limited(2),
            messages::rate_limited(2),
        ]
    );
}
