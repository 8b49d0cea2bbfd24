/// Settings — places scenes happen, with the scenery around them.
use super::object::ObjectRef;
use crate::core::context::NarrativeContext;

#[derive(Debug, Clone)]
pub struct Setting {
    pub roof: ObjectRef,
    pub nearby: Vec<ObjectRef>,
    pub indoors: bool,
    /// The setting one ends up in after leaving this one.
    pub outside: Option<ObjectRef>,
    /// "on the bridge", "in the fortress"
    pub preposition: String,
    pub has_drones: bool,
    pub light: String,
}

impl Setting {
    pub fn new(roof: ObjectRef, nearby: Vec<ObjectRef>) -> Self {
        Self {
            roof,
            nearby,
            indoors: true,
            outside: None,
            preposition: "on".to_string(),
            has_drones: false,
            light: "light".to_string(),
        }
    }

    /// Anything nearby, takeable or not.
    pub fn nearby(&self, ctx: &mut NarrativeContext) -> Option<ObjectRef> {
        ctx.choose(&self.nearby).cloned()
    }

    /// A random fixed piece of scenery.
    pub fn nearby_scenery(&self, ctx: &mut NarrativeContext) -> Option<ObjectRef> {
        let scenery: Vec<ObjectRef> = self
            .nearby
            .iter()
            .filter(|o| !o.is_takeable())
            .cloned()
            .collect();
        ctx.choose(&scenery).cloned()
    }

    /// A random item that can be picked up.
    pub fn nearby_takeable(&self, ctx: &mut NarrativeContext) -> Option<ObjectRef> {
        let items: Vec<ObjectRef> = self
            .nearby
            .iter()
            .filter(|o| o.is_takeable())
            .cloned()
            .collect();
        ctx.choose(&items).cloned()
    }

    pub fn has_scenery(&self) -> bool {
        self.nearby.iter().any(|o| !o.is_takeable())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::object::Object;

    fn deck() -> Setting {
        Setting::new(
            Object::thing(["ceiling"]).into_ref(),
            vec![
                Object::thing(["console"]).into_ref(),
                Object::thing(["stylus"]).takeable(true).into_ref(),
            ],
        )
    }

    #[test]
    fn scenery_and_takeables_are_partitioned() {
        let deck = deck();
        let mut ctx = NarrativeContext::new(1);
        for _ in 0..10 {
            assert_eq!(deck.nearby_scenery(&mut ctx).unwrap().name(), "console");
            assert_eq!(deck.nearby_takeable(&mut ctx).unwrap().name(), "stylus");
        }
        assert!(deck.has_scenery());
    }

    #[test]
    fn no_takeables_yields_none() {
        let mut deck = deck();
        deck.nearby.retain(|o| !o.is_takeable());
        assert!(deck.nearby_takeable(&mut NarrativeContext::new(1)).is_none());
    }
}
