pub struct Metabolism;

impl Metabolism {
    pub fn OnPlayerDie(&self, player: BasePlayer, info: HitInfo) {}
}

fn on_player_die(player: BasePlayer, info: HitInfo) {}
