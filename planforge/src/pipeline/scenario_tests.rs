//! End-to-end scenarios: passes, gating, research spawning, live updates.

#[cfg(test)]
mod tests {
    use crate::agents::MissingInfo;
    use crate::context::{Horizon, StageName};
    use crate::errors::AgentFault;
    use crate::hub::{EventKind, HubConfig, UpdateEvent, UpdateHub};
    use crate::pipeline::{Coordinator, GateConfig, PassStatus, RetryConfig};
    use crate::scheduler::{ResearchScheduler, ResearchTier, SchedulerConfig, TaskState};
    use crate::testing::{fixtures, ScriptedAgent, StubResearchProvider};
    use std::sync::Arc;
    use std::time::Duration;
    use tokio::sync::mpsc;

    fn agents() -> (Arc<ScriptedAgent>, Arc<ScriptedAgent>, Arc<ScriptedAgent>) {
        (
            Arc::new(ScriptedAgent::new(StageName::Discovery)),
            Arc::new(ScriptedAgent::new(StageName::Objectives)),
            Arc::new(ScriptedAgent::new(StageName::Roadmap)),
        )
    }

    fn coordinator(
        discovery: &Arc<ScriptedAgent>,
        objectives: &Arc<ScriptedAgent>,
        roadmap: &Arc<ScriptedAgent>,
    ) -> Coordinator {
        Coordinator::builder()
            .agent(discovery.clone())
            .agent(objectives.clone())
            .agent(roadmap.clone())
            .retry(RetryConfig::new().with_max_attempts(1))
            .build()
            .unwrap()
    }

    async fn collect_events(
        receiver: &mut mpsc::Receiver<UpdateEvent>,
        wanted: usize,
    ) -> Vec<UpdateEvent> {
        let mut events = Vec::new();
        while events.len() < wanted {
            let event = tokio::time::timeout(Duration::from_secs(5), receiver.recv())
                .await
                .expect("timed out waiting for hub events")
                .expect("hub closed early");
            events.push(event);
        }
        events
    }

    /// A session walks the three gates over several passes. A stage that
    /// passed its gate with room to spare is never evaluated again when a
    /// later stage holds the workflow.
    #[tokio::test]
    async fn test_gated_walk_never_reinvokes_passed_stages() {
        let (discovery, objectives, roadmap) = agents();
        let coordinator = coordinator(&discovery, &objectives, &roadmap);
        let mut ctx = fixtures::context();

        // Pass 1: discovery is unsure and holds the pass.
        discovery.push_report(fixtures::gated_report(
            StageName::Discovery,
            0.6,
            vec![MissingInfo::CurrentSituation],
        ));
        let outcome = coordinator.run_pass(&mut ctx, None).await.unwrap();
        assert_eq!(
            outcome.status,
            PassStatus::NeedsInput {
                stage: StageName::Discovery,
                missing: vec![MissingInfo::CurrentSituation],
            }
        );
        assert_eq!(objectives.call_count(), 0);
        assert_eq!(roadmap.call_count(), 0);

        // Pass 2: discovery clears 0.9, objectives clears 0.9 with 0.95,
        // roadmap holds under its 0.8 bar.
        discovery.push_report(fixtures::ready_report(StageName::Discovery, 0.92));
        objectives.push_report(fixtures::ready_report(StageName::Objectives, 0.95));
        roadmap.push_report(fixtures::gated_report(
            StageName::Roadmap,
            0.5,
            vec![MissingInfo::Priorities],
        ));
        let outcome = coordinator
            .run_pass(&mut ctx, Some("final-year physics student, aiming at climate research"))
            .await
            .unwrap();
        assert!(matches!(
            outcome.status,
            PassStatus::NeedsInput { stage: StageName::Roadmap, .. }
        ));
        assert_eq!(ctx.workflow().stage(), StageName::Roadmap);

        // Pass 3: resumes at roadmap; 0.85 clears the 0.8 bar.
        roadmap.push_report(fixtures::ready_report(StageName::Roadmap, 0.85));
        let outcome = coordinator
            .run_pass(&mut ctx, Some("prioritise the internship first"))
            .await
            .unwrap();
        assert_eq!(outcome.status, PassStatus::Complete);

        // The earlier stages were never re-run once their gates were met.
        assert_eq!(discovery.call_count(), 2);
        assert_eq!(objectives.call_count(), 1);
        assert_eq!(roadmap.call_count(), 2);
    }

    /// A completed pass hands its proposals through the spawn policy and on
    /// to the scheduler; a subscribed observer sees each approved task run
    /// to completion.
    #[tokio::test]
    async fn test_complete_pass_spawns_research_and_notifies() {
        let (discovery, objectives, roadmap) = agents();
        discovery.push_report(fixtures::ready_report(StageName::Discovery, 0.95));
        objectives.push_report(fixtures::ready_report(StageName::Objectives, 0.95));
        roadmap.push_report(
            fixtures::ready_report(StageName::Roadmap, 0.9).with_proposals(vec![
                fixtures::proposal("item-1", "University Research Plan", Horizon::Tactical)
                    .with_tier(ResearchTier::Lite),
                fixtures::proposal("item-2", "Morning Routine", Horizon::Tactical),
                fixtures::proposal("item-3", "Morning Routine", Horizon::Strategic),
            ]),
        );
        let coordinator = coordinator(&discovery, &objectives, &roadmap);

        let mut ctx = fixtures::context();
        let outcome = coordinator.run_pass(&mut ctx, None).await.unwrap();
        assert_eq!(outcome.status, PassStatus::Complete);

        // Tactical with a keyword and strategic pass; bare tactical does not.
        assert_eq!(outcome.approved.len(), 2);
        assert_eq!(outcome.rejected, 1);
        assert_eq!(outcome.approved[0].subject_id, "item-1");
        assert_eq!(outcome.approved[1].subject_id, "item-3");

        let hub = UpdateHub::new(HubConfig::new());
        let mut subscription = hub.subscribe();
        let scheduler = ResearchScheduler::new(
            Arc::new(StubResearchProvider::ok("three shortlisted programs")),
            Arc::clone(&hub),
            SchedulerConfig::new(),
        )
        .unwrap();
        scheduler.start();

        let receipts = scheduler.submit_approved(&outcome.approved).unwrap();
        assert_eq!(receipts.len(), 2);
        assert_eq!(receipts[0].estimated_seconds, 30);
        assert!(!receipts[0].deduplicated);

        // connected ack, then two full task lifecycles of four events each.
        let events = collect_events(&mut subscription.receiver, 9).await;
        assert_eq!(events[0].kind, EventKind::Connected);
        let completed = events
            .iter()
            .filter(|event| event.kind == EventKind::TaskCompleted)
            .count();
        assert_eq!(completed, 2);

        let snapshot = scheduler.status(receipts[0].task_id).unwrap();
        assert_eq!(snapshot.state, TaskState::Complete);

        scheduler.shutdown().await;
        hub.shutdown().await;
    }

    /// A transient provider blip inside a stage is retried and the pass
    /// still completes; the caller never sees the fault.
    #[tokio::test]
    async fn test_transient_fault_recovers_within_pass() {
        let (discovery, objectives, roadmap) = agents();
        discovery.push_fault(AgentFault::transient("upstream timeout"));
        discovery.push_report(fixtures::ready_report(StageName::Discovery, 0.95));
        objectives.push_report(fixtures::ready_report(StageName::Objectives, 0.95));
        roadmap.push_report(fixtures::ready_report(StageName::Roadmap, 0.9));

        let coordinator = Coordinator::builder()
            .agent(discovery.clone())
            .agent(objectives.clone())
            .agent(roadmap.clone())
            .retry(RetryConfig::new().with_max_attempts(2).with_base_delay_ms(1))
            .build()
            .unwrap();

        let mut ctx = fixtures::context();
        let outcome = coordinator.run_pass(&mut ctx, None).await.unwrap();

        assert_eq!(outcome.status, PassStatus::Complete);
        assert!(outcome.faults.is_empty());
        assert_eq!(discovery.call_count(), 2);
    }

    /// Repeated gate misses are absorbed up to the attempt bound, then the
    /// session escalates to a human.
    #[tokio::test]
    async fn test_repeated_misses_escalate_past_allowance() {
        let (discovery, objectives, roadmap) = agents();
        for _ in 0..3 {
            discovery.push_report(fixtures::gated_report(
                StageName::Discovery,
                0.4,
                vec![MissingInfo::DesiredOutcome],
            ));
        }

        let coordinator = Coordinator::builder()
            .agent(discovery.clone())
            .agent(objectives.clone())
            .agent(roadmap.clone())
            .gate(GateConfig::new().with_max_stage_attempts(2))
            .retry(RetryConfig::new().with_max_attempts(1))
            .build()
            .unwrap();

        let mut ctx = fixtures::context();
        for _ in 0..2 {
            let outcome = coordinator.run_pass(&mut ctx, Some("not sure yet")).await.unwrap();
            assert!(matches!(
                outcome.status,
                PassStatus::NeedsInput { stage: StageName::Discovery, .. }
            ));
        }

        let outcome = coordinator.run_pass(&mut ctx, Some("still not sure")).await.unwrap();
        assert_eq!(
            outcome.status,
            PassStatus::Escalated {
                stage: StageName::Discovery
            }
        );
        assert_eq!(roadmap.call_count(), 0);
    }
}
